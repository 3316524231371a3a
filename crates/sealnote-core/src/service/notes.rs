//! Envelope-encrypted note operations.
//!
//! The caller supplies the content secret per request; this service never
//! retains it. Plaintext exists only inside a call: what reaches the note
//! store is always ciphertext.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use uuid::Uuid;

use crate::config::NoteLimits;
use crate::crypto::{envelope, ContentSecret};
use crate::error::{Result, SealnoteError};
use crate::storage::types::DecryptedNote;
use crate::storage::{Note, NoteStore, NoteSummary};
use crate::validate;

/// Note CRUD and listings over a note repository.
pub struct NoteService {
    store: Arc<dyn NoteStore>,
    limits: NoteLimits,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>, limits: NoteLimits) -> Self {
        Self { store, limits }
    }

    /// Create a note for `owner`.
    ///
    /// The per-owner note limit is checked before any cryptographic work.
    ///
    /// # Errors
    ///
    /// `SealnoteError::NoteLimitExceeded` at the limit,
    /// `SealnoteError::Validation` for out-of-bounds header/content.
    pub fn create(
        &self,
        owner: Uuid,
        header: &str,
        content: &str,
        secret: &ContentSecret,
    ) -> Result<Note> {
        validate::validate_header(header, &self.limits)?;
        validate::validate_content(content, &self.limits)?;

        if self.store.count_by_owner(&owner)? >= self.limits.max_notes_per_user {
            return Err(SealnoteError::NoteLimitExceeded);
        }

        let envelope = envelope::seal(header.as_bytes(), content.as_bytes(), secret)?;
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            owner,
            created_at: now,
            modified_at: now,
            envelope,
        };
        self.store.insert_note(&note)?;
        tracing::debug!(note = %note.id, "created note");
        Ok(note)
    }

    /// Fetch and decrypt one note for its owner.
    ///
    /// Unlike listings, a decryption failure here is user-visible.
    pub fn get_decrypted(
        &self,
        id: &Uuid,
        owner: &Uuid,
        secret: &ContentSecret,
    ) -> Result<DecryptedNote> {
        let note = self.owned_note(id, owner)?;
        let (header, content) = envelope::open(&note.envelope, secret)?;

        Ok(DecryptedNote {
            id: note.id,
            owner: note.owner,
            created_at: note.created_at,
            modified_at: note.modified_at,
            header: String::from_utf8(header).map_err(|_| SealnoteError::Decryption)?,
            content: String::from_utf8(content).map_err(|_| SealnoteError::Decryption)?,
        })
    }

    /// Replace a note's header and content.
    ///
    /// Every update re-seals from scratch: fresh data key, IV, and wrap
    /// salt. The previous data key is never reused.
    pub fn update(
        &self,
        id: &Uuid,
        owner: &Uuid,
        header: &str,
        content: &str,
        secret: &ContentSecret,
    ) -> Result<Note> {
        validate::validate_header(header, &self.limits)?;
        validate::validate_content(content, &self.limits)?;

        let mut note = self.owned_note(id, owner)?;
        note.envelope = envelope::seal(header.as_bytes(), content.as_bytes(), secret)?;
        note.modified_at = Utc::now();
        self.store.update_note(&note)?;
        Ok(note)
    }

    /// Delete a note. Owners delete their own; admins delete any.
    pub fn delete(&self, id: &Uuid, requester: &Uuid, is_admin: bool) -> Result<()> {
        if !is_admin {
            self.owned_note(id, requester)?;
        }
        self.store.delete_note(id)
    }

    /// List one owner's notes with headers decrypted best-effort.
    ///
    /// A note whose header will not open under the supplied secret
    /// contributes its ciphertext header (base64) instead of failing the
    /// whole listing.
    pub fn list_for_owner(&self, owner: &Uuid, secret: &ContentSecret) -> Result<Vec<NoteSummary>> {
        let notes = self.store.list_by_owner(owner)?;
        Ok(notes
            .into_iter()
            .map(|note| match envelope::open_header(&note.envelope, secret)
                .map(String::from_utf8)
            {
                Ok(Ok(header)) => summary(&note, header, false),
                _ => {
                    tracing::debug!(note = %note.id, "header fell back to ciphertext in listing");
                    encrypted_summary(&note)
                }
            })
            .collect())
    }

    /// List every note with ciphertext headers: the admin view.
    ///
    /// Administrators have no path to plaintext; this listing never
    /// touches a secret.
    pub fn list_all_encrypted(&self) -> Result<Vec<NoteSummary>> {
        let notes = self.store.list_all()?;
        Ok(notes.iter().map(encrypted_summary).collect())
    }

    fn owned_note(&self, id: &Uuid, owner: &Uuid) -> Result<Note> {
        let note = self
            .store
            .get_note(id)?
            .ok_or(SealnoteError::NoteNotFound(*id))?;
        if note.owner != *owner {
            return Err(SealnoteError::Unauthorized);
        }
        Ok(note)
    }
}

fn summary(note: &Note, header: String, encrypted: bool) -> NoteSummary {
    NoteSummary {
        id: note.id,
        owner: note.owner,
        created_at: note.created_at,
        modified_at: note.modified_at,
        header,
        encrypted,
    }
}

fn encrypted_summary(note: &Note) -> NoteSummary {
    summary(note, BASE64.encode(&note.envelope.header), true)
}
