//! SQLite-backed implementation of the store traits.
//!
//! One connection behind a mutex: lookups are short, and the connection is
//! shared between the event handler and the bridge reader task.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use chrono::{TimeZone, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{connection, queries};
use super::{ContactInfo, ContactStore, ContactUpdate, DeviceSession, DeviceStore, LidStore};
use crate::error::Result;
use crate::jid::Jid;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        Ok(Self::from_connection(connection::open_store(path)?))
    }

    pub fn in_memory() -> anyhow::Result<Self> {
        Ok(Self::from_connection(connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Read a JID stored as text.
fn jid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Jid> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn contact_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<ContactInfo> {
    Ok(ContactInfo {
        found: true,
        full_name: row.get::<_, Option<String>>(offset)?.unwrap_or_default(),
        first_name: row.get::<_, Option<String>>(offset + 1)?.unwrap_or_default(),
        push_name: row.get::<_, Option<String>>(offset + 2)?.unwrap_or_default(),
        business_name: row.get::<_, Option<String>>(offset + 3)?.unwrap_or_default(),
    })
}

impl DeviceStore for SqliteStore {
    fn first_device(&self) -> Result<Option<DeviceSession>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(queries::FIRST_DEVICE)?;
        let device = stmt
            .query_row([], |row| {
                let paired_at: i64 = row.get(3)?;
                Ok(DeviceSession {
                    id: jid_column(row, 0)?,
                    push_name: row.get(1)?,
                    platform: row.get(2)?,
                    paired_at: Utc.timestamp_opt(paired_at, 0).single().unwrap_or_default(),
                })
            })
            .optional()?;
        Ok(device)
    }

    fn put_device(&self, device: &DeviceSession) -> Result<()> {
        self.conn().execute(
            queries::PUT_DEVICE,
            params![
                device.id.to_string(),
                device.push_name,
                device.platform,
                device.paired_at.timestamp(),
            ],
        )?;
        Ok(())
    }
}

impl LidStore for SqliteStore {
    fn pn_for_lid(&self, lid: &Jid) -> Result<Option<Jid>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(queries::PN_FOR_LID)?;
        let pn = stmt
            .query_row([lid.to_non_ad().to_string()], |row| jid_column(row, 0))
            .optional()?;
        Ok(pn)
    }

    fn put_lid_mapping(&self, lid: &Jid, pn: &Jid) -> Result<()> {
        self.conn().execute(
            queries::PUT_LID_MAPPING,
            params![lid.to_non_ad().to_string(), pn.to_non_ad().to_string()],
        )?;
        Ok(())
    }
}

impl ContactStore for SqliteStore {
    fn get_contact(&self, jid: &Jid) -> Result<ContactInfo> {
        let conn = self.conn();
        let mut stmt = conn.prepare(queries::GET_CONTACT)?;
        let contact = stmt
            .query_row([jid.to_non_ad().to_string()], |row| contact_from_row(row, 0))
            .optional()?;
        Ok(contact.unwrap_or_default())
    }

    fn put_contact(&self, jid: &Jid, update: &ContactUpdate) -> Result<()> {
        self.conn().execute(
            queries::PUT_CONTACT,
            params![
                jid.to_non_ad().to_string(),
                update.full_name,
                update.first_name,
                update.push_name,
                update.business_name,
            ],
        )?;
        Ok(())
    }

    fn all_contacts(&self) -> Result<Vec<(Jid, ContactInfo)>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(queries::ALL_CONTACTS)?;
        let rows = stmt.query_map([], |row| Ok((jid_column(row, 0)?, contact_from_row(row, 1)?)))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
