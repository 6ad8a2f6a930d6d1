//! Status command: show whether this installation holds a paired device.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::Config;
use crate::output::OutputControls;
use crate::store::{DeviceSession, DeviceStore, SqliteStore};

#[derive(Debug, Serialize)]
struct Status<'a> {
    paired: bool,
    device: Option<&'a DeviceSession>,
    db_path: String,
    socket_path: String,
}

pub fn status(config: &Config, output: &OutputControls) -> Result<()> {
    let store = SqliteStore::open(&config.db_path).context("Failed to open session store")?;
    let device = store.first_device().context("Failed to read device session")?;

    if output.json {
        output.print(&Status {
            paired: device.is_some(),
            device: device.as_ref(),
            db_path: config.db_path.display().to_string(),
            socket_path: config.socket_path.display().to_string(),
        });
        return Ok(());
    }

    println!("Store:  {}", config.db_path.display());
    println!("Bridge: {}", config.socket_path.display());
    match device {
        Some(device) => {
            println!("Paired: yes");
            println!("Device: {}", device.id);
            if let Some(name) = device.push_name.as_deref() {
                println!("Name:   {}", name);
            }
            if let Some(platform) = device.platform.as_deref() {
                println!("Platform: {}", platform);
            }
            println!("Since:  {}", device.paired_at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        None => {
            println!("Paired: no");
            println!("Run 'wolfies-whatsapp run' to pair this device.");
        }
    }
    Ok(())
}
