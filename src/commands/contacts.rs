//! Contact commands: contacts, import-contacts.
//!
//! CHANGELOG:
//! - 10/18/2026 - List from the SQLite store, import from a contacts JSON file

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::Config;
use crate::contacts::manager;
use crate::contacts::resolver::best_name;
use crate::jid::Jid;
use crate::output::OutputControls;
use crate::store::{ContactStore, SqliteStore};

#[derive(Debug, Serialize)]
struct ContactRow {
    jid: Jid,
    name: String,
    full_name: String,
    first_name: String,
    push_name: String,
    business_name: String,
}

/// List all stored contacts.
pub fn list(config: &Config, output: &OutputControls) -> Result<()> {
    let store = SqliteStore::open(&config.db_path).context("Failed to open session store")?;
    let rows: Vec<ContactRow> = store
        .all_contacts()
        .context("Failed to read contacts")?
        .into_iter()
        .map(|(jid, info)| ContactRow {
            jid,
            name: best_name(&info).to_string(),
            full_name: info.full_name,
            first_name: info.first_name,
            push_name: info.push_name,
            business_name: info.business_name,
        })
        .collect();

    if output.json {
        output.print(&rows);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No contacts found.");
        println!("Contacts arrive from the bridge once paired, or use 'import-contacts <file>'.");
        return Ok(());
    }

    println!("Contacts ({}):", rows.len());
    println!("{}", "-".repeat(50));
    for row in &rows {
        let business = if row.business_name.is_empty() {
            String::new()
        } else {
            format!(" [{}]", row.business_name)
        };
        let name = if row.name.is_empty() { "(no name)" } else { &row.name };
        println!("{}: {}{}", name, row.jid, business);
    }
    Ok(())
}

/// Import contacts from a JSON file into the store.
pub fn import(config: &Config, path: &str, output: &OutputControls) -> Result<()> {
    let path = shellexpand::tilde(path).to_string();
    let entries = manager::load(&path)?;
    let store = SqliteStore::open(&config.db_path).context("Failed to open session store")?;
    let imported = manager::import(&store, &entries)?;

    if output.json {
        output.print(&serde_json::json!({ "imported": imported, "path": path }));
    } else {
        println!("Imported {} contact(s) from {}", imported, path);
    }
    Ok(())
}
