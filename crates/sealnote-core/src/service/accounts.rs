//! Account registration and login.
//!
//! Registration derives the content secret from the new password and a
//! fresh account salt, then stores only the scrypt re-hash of that
//! secret. Login reproduces the secret from the submitted password and
//! the stored salt, verifies it against the stored credential, and hands
//! the secret to the caller for the duration of the request. The lockout
//! gate runs before any credential work.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::LockoutConfig;
use crate::crypto::{credential, kdf, ContentSecret};
use crate::error::{Result, SealnoteError};
use crate::lockout;
use crate::storage::{Account, AccountStore, NewAccount, Role};
use crate::validate;

/// The outcome of a successful login.
///
/// The secret is owned by the caller for the life of one request and is
/// zeroized when the session is dropped. It is never persisted.
pub struct LoginSession {
    pub account_id: Uuid,
    pub email: String,
    pub roles: Vec<Role>,
    pub secret: ContentSecret,
}

/// Registration and authentication over an account repository.
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    lockout: LockoutConfig,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>, lockout: LockoutConfig) -> Self {
        Self { store, lockout }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `SealnoteError::Validation` for a malformed email or weak
    /// password, or when the email is already registered.
    pub fn register(&self, email: &str, password: &str, roles: Vec<Role>) -> Result<Account> {
        validate::validate_email(email)?;
        validate::validate_password(password)?;

        let email = email.trim().to_ascii_lowercase();
        let salt = kdf::generate_salt();
        let secret = kdf::derive_content_secret(password, &salt)?;
        let stored = credential::register_credential(&secret)?;

        let account = self.store.insert_account(&NewAccount {
            email,
            credential: stored,
            salt,
            roles,
        })?;
        tracing::debug!(account = %account.id, "registered account");
        Ok(account)
    }

    /// Authenticate and produce a login session.
    ///
    /// A locked account is rejected before any credential verification,
    /// independent of whether the password is correct. A failed attempt
    /// records a lockout transition atomically; a successful one resets
    /// the counters.
    ///
    /// # Errors
    ///
    /// `SealnoteError::AccountLocked` while the lock window is open,
    /// `SealnoteError::CredentialMismatch` for an unknown email or wrong
    /// password; the two cases are not distinguished.
    pub fn login(&self, email: &str, password: &str, now: DateTime<Utc>) -> Result<LoginSession> {
        let email = email.trim().to_ascii_lowercase();
        let account = self
            .store
            .find_by_email(&email)?
            .ok_or(SealnoteError::CredentialMismatch)?;

        let state = account.lockout_state();
        if let Some(until) = state.locked_until {
            if now < until {
                return Err(SealnoteError::AccountLocked { until });
            }
        }

        let secret = kdf::derive_content_secret(password, &account.salt)?;

        if credential::verify_credential(&secret, &account.credential) {
            self.store
                .update_lockout(&account.id, lockout::record_success(state))?;
            Ok(LoginSession {
                account_id: account.id,
                email: account.email,
                roles: account.roles,
                secret,
            })
        } else {
            let next = lockout::record_failure(state, &self.lockout, now);
            self.store.update_lockout(&account.id, next)?;
            tracing::debug!(
                account = %account.id,
                failed_count = next.failed_count,
                "failed login attempt"
            );
            Err(SealnoteError::CredentialMismatch)
        }
    }

    /// Look up an account's current lockout window, if any.
    pub fn lock_status(&self, email: &str) -> Result<Option<DateTime<Utc>>> {
        let email = email.trim().to_ascii_lowercase();
        let account = self
            .store
            .find_by_email(&email)?
            .ok_or(SealnoteError::AccountNotFound)?;
        Ok(account.locked_until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;

    fn service() -> AccountService {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        AccountService::new(store, LockoutConfig::default())
    }

    #[test]
    fn test_register_normalizes_email_and_stores_credential() {
        let service = service();
        let account = service
            .register("  User@Example.COM ", "Str0ng!Passw0rd", vec![Role::User])
            .unwrap();

        assert_eq!(account.email, "user@example.com");
        assert!(account.credential.starts_with("$scrypt$"));
        assert_eq!(account.failed_login_count, 0);
    }

    #[test]
    fn test_register_rejects_bad_input() {
        let service = service();
        assert!(service
            .register("not-an-email", "Str0ng!Passw0rd", vec![Role::User])
            .is_err());
        assert!(service
            .register("user@example.com", "short", vec![Role::User])
            .is_err());
    }

    #[test]
    fn test_register_rejects_duplicate_email() {
        let service = service();
        service
            .register("user@example.com", "Str0ng!Passw0rd", vec![Role::User])
            .unwrap();

        let result = service.register("user@example.com", "0therPassw0rd!", vec![Role::User]);
        assert!(matches!(result, Err(SealnoteError::Validation(_))));
    }

    #[test]
    fn test_login_success_yields_secret() {
        let service = service();
        let account = service
            .register("user@example.com", "Str0ng!Passw0rd", vec![Role::User])
            .unwrap();

        let session = service
            .login("user@example.com", "Str0ng!Passw0rd", Utc::now())
            .unwrap();
        assert_eq!(session.account_id, account.id);
        assert_eq!(session.roles, vec![Role::User]);
    }

    #[test]
    fn test_login_secret_is_reproducible() {
        let service = service();
        service
            .register("user@example.com", "Str0ng!Passw0rd", vec![Role::User])
            .unwrap();

        let first = service
            .login("user@example.com", "Str0ng!Passw0rd", Utc::now())
            .unwrap();
        let second = service
            .login("user@example.com", "Str0ng!Passw0rd", Utc::now())
            .unwrap();

        // Same password + fixed account salt: the content secret is the
        // same across sessions, so old notes stay decryptable.
        assert_eq!(first.secret.as_bytes(), second.secret.as_bytes());
    }

    #[test]
    fn test_wrong_password_and_unknown_email_look_alike() {
        let service = service();
        service
            .register("user@example.com", "Str0ng!Passw0rd", vec![Role::User])
            .unwrap();

        let wrong = service.login("user@example.com", "WrongPassw0rd!", Utc::now());
        let unknown = service.login("ghost@example.com", "Str0ng!Passw0rd", Utc::now());

        assert!(matches!(wrong, Err(SealnoteError::CredentialMismatch)));
        assert!(matches!(unknown, Err(SealnoteError::CredentialMismatch)));
    }

    #[test]
    fn test_failures_lock_account_even_for_correct_password() {
        let service = service();
        service
            .register("user@example.com", "Str0ng!Passw0rd", vec![Role::User])
            .unwrap();

        let now = Utc::now();
        for _ in 0..4 {
            let _ = service.login("user@example.com", "WrongPassw0rd!", now);
        }

        assert!(service.lock_status("user@example.com").unwrap().is_some());

        // Correct password while the window is open is still rejected.
        let result = service.login("user@example.com", "Str0ng!Passw0rd", now);
        assert!(matches!(result, Err(SealnoteError::AccountLocked { .. })));
    }

    #[test]
    fn test_success_after_expiry_resets_counters() {
        let service = service();
        service
            .register("user@example.com", "Str0ng!Passw0rd", vec![Role::User])
            .unwrap();

        let now = Utc::now();
        for _ in 0..3 {
            let _ = service.login("user@example.com", "WrongPassw0rd!", now);
        }

        // Attempt after the short window has passed.
        let later = now + chrono::Duration::milliseconds(61_000);
        service
            .login("user@example.com", "Str0ng!Passw0rd", later)
            .unwrap();

        assert_eq!(service.lock_status("user@example.com").unwrap(), None);
    }
}
