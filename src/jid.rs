//! WhatsApp addressing: JIDs and the server domains that tag them.
//!
//! A JID is `user[.agent][:device]@server`. The server decides what kind of address it is:
//! phone-derived users live on `s.whatsapp.net`, hidden users (LIDs) on `lid`,
//! status updates and broadcast lists on `broadcast`.
//!
//! CHANGELOG:
//! - 10/18/2026 - Parse the `.agent` segment
//! - 10/18/2026 - Initial implementation

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Standard user server. Every stable identity lives here.
pub const DEFAULT_USER_SERVER: &str = "s.whatsapp.net";
/// Legacy user server still seen on some older payloads.
pub const LEGACY_USER_SERVER: &str = "c.us";
/// Hidden-user (LID) server.
pub const HIDDEN_USER_SERVER: &str = "lid";
/// Status updates and broadcast lists.
pub const BROADCAST_SERVER: &str = "broadcast";
/// Group chats.
pub const GROUP_SERVER: &str = "g.us";

/// What kind of address a JID is, derived from its server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    PhoneDerived,
    HiddenUser,
    Broadcast,
    Group,
    Other,
}

/// A WhatsApp JID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Jid {
    pub user: String,
    pub server: String,
    /// Routing agent (`user.agent@server`), 0 when absent.
    pub agent: u8,
    /// Device index for multi-device addresses (`user:device@server`), 0 for the primary.
    pub device: u16,
}

impl Jid {
    pub fn new(user: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            server: server.into(),
            agent: 0,
            device: 0,
        }
    }

    /// A stable, comparable identity: the user-portion on the standard user server.
    pub fn user_jid(user: impl Into<String>) -> Self {
        Self::new(user, DEFAULT_USER_SERVER)
    }

    pub fn kind(&self) -> AddressKind {
        match self.server.as_str() {
            DEFAULT_USER_SERVER | LEGACY_USER_SERVER => AddressKind::PhoneDerived,
            HIDDEN_USER_SERVER => AddressKind::HiddenUser,
            BROADCAST_SERVER => AddressKind::Broadcast,
            GROUP_SERVER => AddressKind::Group,
            _ => AddressKind::Other,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_empty() && self.server.is_empty()
    }

    /// Same JID without the agent and device parts.
    pub fn to_non_ad(&self) -> Self {
        Self::new(self.user.clone(), self.server.clone())
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.user.is_empty() {
            return write!(f, "{}", self.server);
        }
        write!(f, "{}", self.user)?;
        if self.agent > 0 {
            write!(f, ".{}", self.agent)?;
        }
        if self.device > 0 {
            write!(f, ":{}", self.device)?;
        }
        write!(f, "@{}", self.server)
    }
}

impl FromStr for Jid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidJid(s.to_string()));
        }

        let Some((user_part, server)) = s.split_once('@') else {
            // Server-only JID, e.g. "s.whatsapp.net"
            return Ok(Self::new("", s));
        };

        if server.is_empty() || server.contains('@') {
            return Err(Error::InvalidJid(s.to_string()));
        }

        let (user, device) = match user_part.split_once(':') {
            Some((user, device)) => {
                let device = device
                    .parse::<u16>()
                    .map_err(|_| Error::InvalidJid(s.to_string()))?;
                (user, device)
            }
            None => (user_part, 0),
        };

        let (user, agent) = match user.split_once('.') {
            Some((user, agent)) => {
                let agent = agent
                    .parse::<u8>()
                    .map_err(|_| Error::InvalidJid(s.to_string()))?;
                (user, agent)
            }
            None => (user, 0),
        };

        if user.is_empty() && agent > 0 {
            return Err(Error::InvalidJid(s.to_string()));
        }

        Ok(Self {
            user: user.to_string(),
            server: server.to_string(),
            agent,
            device,
        })
    }
}

impl Serialize for Jid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Jid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
