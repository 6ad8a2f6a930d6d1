//! Persistence for the device session, LID mappings and contacts.
//!
//! The core only reads through the traits below; writes come from the bridge client
//! (pairing result, contact and LID sync) and the `import-contacts` command.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial module structure

pub mod connection;
pub mod queries;
pub mod sqlite;

pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::jid::Jid;

/// The local device's identity on the network, written once pairing succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSession {
    pub id: Jid,
    #[serde(default)]
    pub push_name: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    pub paired_at: DateTime<Utc>,
}

/// A contact lookup result. `found == false` means no row exists for the JID.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactInfo {
    pub found: bool,
    pub full_name: String,
    pub first_name: String,
    pub push_name: String,
    pub business_name: String,
}

/// Partial contact data. `None` fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactUpdate {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub push_name: Option<String>,
    #[serde(default)]
    pub business_name: Option<String>,
}

pub trait DeviceStore: Send + Sync {
    /// First stored device, if this installation has ever paired.
    fn first_device(&self) -> Result<Option<DeviceSession>>;

    fn put_device(&self, device: &DeviceSession) -> Result<()>;
}

pub trait LidStore: Send + Sync {
    /// Phone-number JID for a hidden-user JID.
    fn pn_for_lid(&self, lid: &Jid) -> Result<Option<Jid>>;

    fn put_lid_mapping(&self, lid: &Jid, pn: &Jid) -> Result<()>;
}

pub trait ContactStore: Send + Sync {
    fn get_contact(&self, jid: &Jid) -> Result<ContactInfo>;

    fn put_contact(&self, jid: &Jid, update: &ContactUpdate) -> Result<()>;

    fn all_contacts(&self) -> Result<Vec<(Jid, ContactInfo)>>;
}

/// Everything the bridge client writes to.
pub trait Store: DeviceStore + LidStore + ContactStore {}

impl<T: DeviceStore + LidStore + ContactStore> Store for T {}
