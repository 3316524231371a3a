//! Storage abstraction for Sealnote.
//!
//! Repository-style traits over accounts and notes, plus the SQLite
//! backend. The storage layer only ever sees ciphertext note fields;
//! encryption happens in the service layer above it.
//!
//! Storage backends are responsible for:
//! - Writing a note's crypto fields atomically (never partially)
//! - Serializing lockout read-modify-write per account
//! - Enforcing email uniqueness

pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteStore;
pub use traits::{AccountStore, NoteStore};
pub use types::{Account, DecryptedNote, NewAccount, Note, NoteSummary, Role};
