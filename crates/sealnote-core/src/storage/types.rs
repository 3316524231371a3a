//! Core data types for the storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::envelope::EnvelopeRecord;
use crate::crypto::kdf::SALT_LEN;
use crate::lockout::LockoutState;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

/// A registered account.
///
/// `credential` is the opaque stored login credential (scrypt PHC string
/// over the derived content secret); `salt` is the Argon2 salt, set once
/// at registration and never rotated.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub credential: String,
    pub salt: [u8; SALT_LEN],
    pub roles: Vec<Role>,
    pub failed_login_count: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl Account {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    /// The account's lockout counters as a state machine input.
    pub fn lockout_state(&self) -> LockoutState {
        LockoutState {
            failed_count: self.failed_login_count,
            locked_until: self.locked_until,
        }
    }
}

/// Builder for creating new accounts.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub credential: String,
    pub salt: [u8; SALT_LEN],
    pub roles: Vec<Role>,
}

/// A persisted note. All note payload fields are ciphertext.
#[derive(Debug, Clone)]
pub struct Note {
    pub id: Uuid,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub envelope: EnvelopeRecord,
}

/// A listing row for one note.
///
/// `header` holds the decrypted header when the caller's secret opened
/// it, otherwise the base64 of the header ciphertext (`encrypted` tells
/// which). Content is never part of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct NoteSummary {
    pub id: Uuid,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub header: String,
    pub encrypted: bool,
}

/// A note with its payload decrypted for the requester.
#[derive(Debug, Clone, Serialize)]
pub struct DecryptedNote {
    pub id: Uuid,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub header: String,
    pub content: String,
}
