//! SQLite storage backend.
//!
//! Implements both repository traits over a single connection. The
//! connection mutex doubles as the per-account serialization point for
//! lockout read-modify-write, and every note write carries all five
//! crypto fields in one statement.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use super::traits::{AccountStore, NoteStore};
use super::types::{Account, NewAccount, Note, Role};
use crate::crypto::envelope::{EnvelopeRecord, IV_LEN};
use crate::crypto::kdf::SALT_LEN;
use crate::error::{Result, SealnoteError};
use crate::lockout::LockoutState;

/// SQLite-backed account and note store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Self::from_connection(conn)
    }

    /// Open an in-memory store. Used by tests and throwaway sessions.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS accounts (
                id                 TEXT PRIMARY KEY,
                email              TEXT NOT NULL UNIQUE,
                credential         TEXT NOT NULL,
                salt               BLOB NOT NULL,
                roles              TEXT NOT NULL,
                failed_login_count INTEGER NOT NULL DEFAULT 0,
                locked_until       TEXT
            );
            CREATE TABLE IF NOT EXISTS notes (
                id               TEXT PRIMARY KEY,
                owner            TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                created_at       TEXT NOT NULL,
                modified_at      TEXT NOT NULL,
                header           BLOB NOT NULL,
                content          BLOB NOT NULL,
                wrapped_data_key BLOB NOT NULL,
                wrap_salt        BLOB NOT NULL,
                iv               BLOB NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_notes_owner ON notes(owner);",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| SealnoteError::Storage("SQLite connection poisoned".to_string()))
    }

    fn parse_uuid(value: &str) -> Result<Uuid> {
        Uuid::parse_str(value).map_err(|e| SealnoteError::Storage(format!("Invalid UUID: {}", e)))
    }

    fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| SealnoteError::Storage(format!("Invalid timestamp: {}", e)))
    }

    fn blob_to_array<const N: usize>(blob: Vec<u8>, field: &str) -> Result<[u8; N]> {
        blob.try_into()
            .map_err(|_| SealnoteError::Storage(format!("Invalid {} length", field)))
    }

    #[allow(clippy::type_complexity)]
    fn account_from_row(
        row: (String, String, String, Vec<u8>, String, u32, Option<String>),
    ) -> Result<Account> {
        let (id, email, credential, salt, roles_json, failed_login_count, locked_until) = row;
        let roles: Vec<Role> = serde_json::from_str(&roles_json)
            .map_err(|e| SealnoteError::Storage(format!("Invalid roles JSON: {}", e)))?;
        let locked_until = locked_until
            .as_deref()
            .map(Self::parse_timestamp)
            .transpose()?;

        Ok(Account {
            id: Self::parse_uuid(&id)?,
            email,
            credential,
            salt: Self::blob_to_array::<SALT_LEN>(salt, "salt")?,
            roles,
            failed_login_count,
            locked_until,
        })
    }

    #[allow(clippy::type_complexity)]
    fn note_from_row(
        row: (
            String,
            String,
            String,
            String,
            Vec<u8>,
            Vec<u8>,
            Vec<u8>,
            Vec<u8>,
            Vec<u8>,
        ),
    ) -> Result<Note> {
        let (id, owner, created_at, modified_at, header, content, wrapped_data_key, wrap_salt, iv) =
            row;

        Ok(Note {
            id: Self::parse_uuid(&id)?,
            owner: Self::parse_uuid(&owner)?,
            created_at: Self::parse_timestamp(&created_at)?,
            modified_at: Self::parse_timestamp(&modified_at)?,
            envelope: EnvelopeRecord {
                header,
                content,
                wrapped_data_key,
                wrap_salt: Self::blob_to_array::<SALT_LEN>(wrap_salt, "wrap_salt")?,
                iv: Self::blob_to_array::<IV_LEN>(iv, "iv")?,
            },
        })
    }

    fn query_account(conn: &Connection, sql: &str, param: &str) -> Result<Option<Account>> {
        let row = conn
            .query_row(sql, [param], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, u32>(5)?,
                    row.get::<_, Option<String>>(6)?,
                ))
            })
            .optional()?;

        row.map(Self::account_from_row).transpose()
    }

    fn query_notes(conn: &Connection, sql: &str, params: &[&str]) -> Result<Vec<Note>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Vec<u8>>(4)?,
                row.get::<_, Vec<u8>>(5)?,
                row.get::<_, Vec<u8>>(6)?,
                row.get::<_, Vec<u8>>(7)?,
                row.get::<_, Vec<u8>>(8)?,
            ))
        })?;

        let mut notes = Vec::new();
        for row in rows {
            notes.push(Self::note_from_row(row?)?);
        }
        Ok(notes)
    }
}

const NOTE_COLUMNS: &str =
    "id, owner, created_at, modified_at, header, content, wrapped_data_key, wrap_salt, iv";

const ACCOUNT_COLUMNS: &str =
    "id, email, credential, salt, roles, failed_login_count, locked_until";

impl AccountStore for SqliteStore {
    fn insert_account(&self, account: &NewAccount) -> Result<Account> {
        let conn = self.lock()?;
        let id = Uuid::new_v4();
        let roles_json = serde_json::to_string(&account.roles)
            .map_err(|e| SealnoteError::Storage(format!("Invalid roles: {}", e)))?;

        let result = conn.execute(
            "INSERT INTO accounts (id, email, credential, salt, roles, failed_login_count, locked_until)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, NULL)",
            (
                id.to_string(),
                &account.email,
                &account.credential,
                account.salt.as_slice(),
                roles_json,
            ),
        );

        match result {
            Ok(_) => Ok(Account {
                id,
                email: account.email.clone(),
                credential: account.credential.clone(),
                salt: account.salt,
                roles: account.roles.clone(),
                failed_login_count: 0,
                locked_until: None,
            }),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(SealnoteError::Validation(
                    "Email is already registered".to_string(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let conn = self.lock()?;
        Self::query_account(
            &conn,
            &format!("SELECT {} FROM accounts WHERE email = ?1", ACCOUNT_COLUMNS),
            email,
        )
    }

    fn find_by_id(&self, id: &Uuid) -> Result<Option<Account>> {
        let conn = self.lock()?;
        Self::query_account(
            &conn,
            &format!("SELECT {} FROM accounts WHERE id = ?1", ACCOUNT_COLUMNS),
            &id.to_string(),
        )
    }

    fn update_lockout(&self, id: &Uuid, state: LockoutState) -> Result<()> {
        // The connection lock serializes concurrent failure events for the
        // same account, so counter increments are never lost.
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let updated = tx.execute(
            "UPDATE accounts SET failed_login_count = ?1, locked_until = ?2 WHERE id = ?3",
            (
                state.failed_count,
                state.locked_until.map(|t| t.to_rfc3339()),
                id.to_string(),
            ),
        )?;
        tx.commit()?;

        if updated == 0 {
            return Err(SealnoteError::AccountNotFound);
        }
        Ok(())
    }
}

impl NoteStore for SqliteStore {
    fn insert_note(&self, note: &Note) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO notes (id, owner, created_at, modified_at, header, content, wrapped_data_key, wrap_salt, iv)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            (
                note.id.to_string(),
                note.owner.to_string(),
                note.created_at.to_rfc3339(),
                note.modified_at.to_rfc3339(),
                &note.envelope.header,
                &note.envelope.content,
                &note.envelope.wrapped_data_key,
                note.envelope.wrap_salt.as_slice(),
                note.envelope.iv.as_slice(),
            ),
        )?;
        Ok(())
    }

    fn get_note(&self, id: &Uuid) -> Result<Option<Note>> {
        let conn = self.lock()?;
        let notes = Self::query_notes(
            &conn,
            &format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS),
            &[&id.to_string()],
        )?;
        Ok(notes.into_iter().next())
    }

    fn list_by_owner(&self, owner: &Uuid) -> Result<Vec<Note>> {
        let conn = self.lock()?;
        Self::query_notes(
            &conn,
            &format!(
                "SELECT {} FROM notes WHERE owner = ?1 ORDER BY modified_at DESC",
                NOTE_COLUMNS
            ),
            &[&owner.to_string()],
        )
    }

    fn list_all(&self) -> Result<Vec<Note>> {
        let conn = self.lock()?;
        Self::query_notes(
            &conn,
            &format!("SELECT {} FROM notes ORDER BY modified_at DESC", NOTE_COLUMNS),
            &[],
        )
    }

    fn update_note(&self, note: &Note) -> Result<()> {
        // All five crypto fields travel in one statement; a partial write
        // would leave the note undecryptable.
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE notes SET modified_at = ?1, header = ?2, content = ?3,
                    wrapped_data_key = ?4, wrap_salt = ?5, iv = ?6
             WHERE id = ?7",
            (
                note.modified_at.to_rfc3339(),
                &note.envelope.header,
                &note.envelope.content,
                &note.envelope.wrapped_data_key,
                note.envelope.wrap_salt.as_slice(),
                note.envelope.iv.as_slice(),
                note.id.to_string(),
            ),
        )?;

        if updated == 0 {
            return Err(SealnoteError::NoteNotFound(note.id));
        }
        Ok(())
    }

    fn delete_note(&self, id: &Uuid) -> Result<()> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM notes WHERE id = ?1", [id.to_string()])?;
        if deleted == 0 {
            return Err(SealnoteError::NoteNotFound(*id));
        }
        Ok(())
    }

    fn count_by_owner(&self, owner: &Uuid) -> Result<u32> {
        let conn = self.lock()?;
        let count: u32 = conn.query_row(
            "SELECT COUNT(*) FROM notes WHERE owner = ?1",
            [owner.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::envelope::EnvelopeRecord;

    fn test_account(email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            credential: "$scrypt$ln=17,r=8,p=1$c2FsdHNhbHQ$aGFzaA".to_string(),
            salt: [7u8; SALT_LEN],
            roles: vec![Role::User],
        }
    }

    fn test_note(owner: Uuid) -> Note {
        let now = Utc::now();
        Note {
            id: Uuid::new_v4(),
            owner,
            created_at: now,
            modified_at: now,
            envelope: EnvelopeRecord {
                header: vec![1; 16],
                content: vec![2; 32],
                wrapped_data_key: vec![3; 32],
                wrap_salt: [4u8; SALT_LEN],
                iv: [5u8; IV_LEN],
            },
        }
    }

    #[test]
    fn test_insert_and_find_account() {
        let store = SqliteStore::open_in_memory().unwrap();
        let created = store.insert_account(&test_account("user@example.com")).unwrap();

        let by_email = store.find_by_email("user@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_email.salt, [7u8; SALT_LEN]);
        assert_eq!(by_email.roles, vec![Role::User]);
        assert_eq!(by_email.failed_login_count, 0);
        assert_eq!(by_email.locked_until, None);

        let by_id = store.find_by_id(&created.id).unwrap().unwrap();
        assert_eq!(by_id.email, "user@example.com");

        assert!(store.find_by_email("other@example.com").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_account(&test_account("user@example.com")).unwrap();

        let result = store.insert_account(&test_account("user@example.com"));
        assert!(matches!(result, Err(SealnoteError::Validation(_))));
    }

    #[test]
    fn test_update_lockout_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let account = store.insert_account(&test_account("user@example.com")).unwrap();

        let until = Utc::now() + chrono::Duration::minutes(1);
        store
            .update_lockout(
                &account.id,
                LockoutState {
                    failed_count: 3,
                    locked_until: Some(until),
                },
            )
            .unwrap();

        let reloaded = store.find_by_id(&account.id).unwrap().unwrap();
        assert_eq!(reloaded.failed_login_count, 3);
        assert_eq!(reloaded.locked_until, Some(until));
    }

    #[test]
    fn test_update_lockout_missing_account() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store.update_lockout(&Uuid::new_v4(), LockoutState::default());
        assert!(matches!(result, Err(SealnoteError::AccountNotFound)));
    }

    #[test]
    fn test_note_crud_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let account = store.insert_account(&test_account("user@example.com")).unwrap();

        let note = test_note(account.id);
        store.insert_note(&note).unwrap();

        let loaded = store.get_note(&note.id).unwrap().unwrap();
        assert_eq!(loaded.owner, account.id);
        assert_eq!(loaded.envelope, note.envelope);

        let mut updated = loaded.clone();
        updated.envelope.content = vec![9; 48];
        updated.envelope.wrap_salt = [9u8; SALT_LEN];
        updated.modified_at = Utc::now();
        store.update_note(&updated).unwrap();

        let reloaded = store.get_note(&note.id).unwrap().unwrap();
        assert_eq!(reloaded.envelope.content, vec![9; 48]);
        assert_eq!(reloaded.envelope.wrap_salt, [9u8; SALT_LEN]);

        store.delete_note(&note.id).unwrap();
        assert!(store.get_note(&note.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_note() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store.delete_note(&Uuid::new_v4());
        assert!(matches!(result, Err(SealnoteError::NoteNotFound(_))));
    }

    #[test]
    fn test_list_and_count_by_owner() {
        let store = SqliteStore::open_in_memory().unwrap();
        let alice = store.insert_account(&test_account("alice@example.com")).unwrap();
        let bob = store.insert_account(&test_account("bob@example.com")).unwrap();

        for _ in 0..3 {
            store.insert_note(&test_note(alice.id)).unwrap();
        }
        store.insert_note(&test_note(bob.id)).unwrap();

        assert_eq!(store.list_by_owner(&alice.id).unwrap().len(), 3);
        assert_eq!(store.list_by_owner(&bob.id).unwrap().len(), 1);
        assert_eq!(store.list_all().unwrap().len(), 4);
        assert_eq!(store.count_by_owner(&alice.id).unwrap(), 3);
        assert_eq!(store.count_by_owner(&bob.id).unwrap(), 1);
    }
}
