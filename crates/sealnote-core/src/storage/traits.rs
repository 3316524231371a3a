//! Repository trait definitions.
//!
//! These traits define the interface the service layer works against, so
//! the SQLite backend can be swapped without touching domain logic.

use uuid::Uuid;

use super::types::{Account, NewAccount, Note};
use crate::error::Result;
use crate::lockout::LockoutState;

/// Account repository.
pub trait AccountStore: Send + Sync {
    /// Insert a new account and return it with its generated ID.
    ///
    /// # Errors
    ///
    /// Returns `SealnoteError::Validation` if the email is already
    /// registered.
    fn insert_account(&self, account: &NewAccount) -> Result<Account>;

    /// Look up an account by email.
    fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Look up an account by ID.
    fn find_by_id(&self, id: &Uuid) -> Result<Option<Account>>;

    /// Persist a lockout transition for one account.
    ///
    /// Implementations must serialize concurrent updates for the same
    /// account so failed-login counts are not lost.
    fn update_lockout(&self, id: &Uuid, state: LockoutState) -> Result<()>;
}

/// Note repository. Only ciphertext crosses this boundary.
pub trait NoteStore: Send + Sync {
    /// Insert a new note with all five crypto fields.
    fn insert_note(&self, note: &Note) -> Result<()>;

    /// Get a note by ID.
    fn get_note(&self, id: &Uuid) -> Result<Option<Note>>;

    /// List all notes owned by one account, newest first.
    fn list_by_owner(&self, owner: &Uuid) -> Result<Vec<Note>>;

    /// List every note in the store, newest first.
    fn list_all(&self) -> Result<Vec<Note>>;

    /// Replace a note's envelope and modified timestamp in one write.
    ///
    /// The crypto fields are only ever replaced together; a partial
    /// update would make the note permanently undecryptable.
    fn update_note(&self, note: &Note) -> Result<()>;

    /// Delete a note. No soft-delete.
    fn delete_note(&self, id: &Uuid) -> Result<()>;

    /// Number of notes owned by one account.
    fn count_by_owner(&self, owner: &Uuid) -> Result<u32>;
}
