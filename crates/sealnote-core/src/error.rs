//! Error types for Sealnote core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these to
//! user-friendly messages. Cryptographic failures are deliberately opaque:
//! they never reveal which sub-step failed, so a caller cannot distinguish
//! a wrong key from corrupted ciphertext.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for Sealnote operations.
pub type Result<T> = std::result::Result<T, SealnoteError>;

/// Core error type for Sealnote operations.
#[derive(Debug, Error)]
pub enum SealnoteError {
    /// Key derivation failed (malformed salt or platform failure).
    /// Fatal for the calling operation; never retried.
    #[error("Key derivation failed")]
    Derivation,

    /// Submitted credentials do not match the stored credential.
    /// The expected outcome of a wrong password; drives the lockout policy.
    #[error("Invalid credentials")]
    CredentialMismatch,

    /// Account is locked out from further login attempts.
    #[error("Account is locked")]
    AccountLocked { until: DateTime<Utc> },

    /// Envelope decryption failed (wrong secret or corrupted fields).
    #[error("Note could not be decrypted")]
    Decryption,

    /// Per-owner note limit reached; rejected before any cryptographic work.
    #[error("Note limit reached")]
    NoteLimitExceeded,

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Note not found by ID
    #[error("Note not found: {0}")]
    NoteNotFound(Uuid),

    /// Account not found
    #[error("Account not found")]
    AccountNotFound,

    /// Access to a note the requester does not own
    #[error("Unauthorized access to note")]
    Unauthorized,

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
