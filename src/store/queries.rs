//! SQL for the local store.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial schema and query constants

/// Schema, applied on every open.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS device (
    jid         TEXT PRIMARY KEY,
    push_name   TEXT,
    platform    TEXT,
    paired_at   INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS lid_map (
    lid         TEXT PRIMARY KEY,
    pn          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contacts (
    jid            TEXT PRIMARY KEY,
    full_name      TEXT,
    first_name     TEXT,
    push_name      TEXT,
    business_name  TEXT
);
"#;

/// Oldest pairing first.
pub const FIRST_DEVICE: &str = r#"
SELECT jid, push_name, platform, paired_at
FROM device
ORDER BY paired_at ASC, rowid ASC
LIMIT 1
"#;

pub const PUT_DEVICE: &str = r#"
INSERT INTO device (jid, push_name, platform, paired_at)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT(jid) DO UPDATE SET
    push_name = excluded.push_name,
    platform = excluded.platform
"#;

pub const PN_FOR_LID: &str = r#"
SELECT pn FROM lid_map WHERE lid = ?1
"#;

pub const PUT_LID_MAPPING: &str = r#"
INSERT INTO lid_map (lid, pn) VALUES (?1, ?2)
ON CONFLICT(lid) DO UPDATE SET pn = excluded.pn
"#;

pub const GET_CONTACT: &str = r#"
SELECT full_name, first_name, push_name, business_name
FROM contacts
WHERE jid = ?1
"#;

/// Upsert that only overwrites the fields present in the update.
pub const PUT_CONTACT: &str = r#"
INSERT INTO contacts (jid, full_name, first_name, push_name, business_name)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT(jid) DO UPDATE SET
    full_name = COALESCE(excluded.full_name, contacts.full_name),
    first_name = COALESCE(excluded.first_name, contacts.first_name),
    push_name = COALESCE(excluded.push_name, contacts.push_name),
    business_name = COALESCE(excluded.business_name, contacts.business_name)
"#;

pub const ALL_CONTACTS: &str = r#"
SELECT jid, full_name, first_name, push_name, business_name
FROM contacts
ORDER BY jid
"#;
