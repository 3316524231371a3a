//! Key derivation profiles.
//!
//! Two independent profiles live here and share no state, salts, or
//! iteration counts:
//!
//! - `derive_content_secret` (Argon2id) turns a password plus the account
//!   salt into the 32-byte content secret used for login verification and
//!   note decryption.
//! - `derive_wrap_key` (PBKDF2-HMAC-SHA256) turns the content secret plus
//!   a per-note salt into the key that wraps a note's data key.

use argon2::Argon2;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::error::{Result, SealnoteError};

/// Argon2id parameters for the content secret.
///
/// Memory 16 MiB, 2 iterations, single lane, per OWASP password storage
/// guidance for interactive logins.
const ARGON2_MEMORY_KIB: u32 = 16 * 1024;
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;

/// PBKDF2 iteration count for wrapping-key derivation.
const PBKDF2_ITERATIONS: u32 = 65536;

/// Minimum salt length accepted by either profile, in bytes.
pub const MIN_SALT_LEN: usize = 16;

/// Length of generated salts in bytes.
pub const SALT_LEN: usize = 16;

/// Length of the derived content secret in bytes.
pub const SECRET_LEN: usize = 32;

/// Length of the derived wrapping key in bytes (AES-256).
pub const WRAP_KEY_LEN: usize = 32;

/// The 32-byte secret derived from a user's password and account salt.
///
/// Reproducible from the password, never persisted. Callers own it for the
/// life of one request; no component retains it beyond a call. Key material
/// is zeroized from memory on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct ContentSecret {
    bytes: [u8; SECRET_LEN],
}

impl ContentSecret {
    pub(crate) fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self { bytes }
    }

    /// Get a reference to the raw secret bytes.
    ///
    /// Avoid storing or logging this value. Use only for immediate
    /// cryptographic operations.
    pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for ContentSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentSecret")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// A wrapping key derived from a content secret and a per-note salt.
/// Used only to wrap and unwrap a note's data key. Zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct WrapKey {
    bytes: [u8; WRAP_KEY_LEN],
}

impl WrapKey {
    pub(crate) fn as_bytes(&self) -> &[u8; WRAP_KEY_LEN] {
        &self.bytes
    }
}

/// Derive the content secret from a password using Argon2id.
///
/// Deterministic: the same password and salt always produce the same
/// secret, so a user who knows their password can always re-derive it.
///
/// # Errors
///
/// Returns `SealnoteError::Derivation` if the salt is shorter than 16
/// bytes or the platform fails to run the derivation. Fatal for the
/// calling operation; not retried.
pub fn derive_content_secret(password: &str, salt: &[u8]) -> Result<ContentSecret> {
    if salt.len() < MIN_SALT_LEN {
        return Err(SealnoteError::Derivation);
    }

    let params = argon2::Params::new(
        ARGON2_MEMORY_KIB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
        Some(SECRET_LEN),
    )
    .map_err(|_| SealnoteError::Derivation)?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut secret = [0u8; SECRET_LEN];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut secret)
        .map_err(|_| SealnoteError::Derivation)?;

    Ok(ContentSecret::from_bytes(secret))
}

/// Derive a wrapping key from a content secret and a per-note salt using
/// PBKDF2-HMAC-SHA256.
pub fn derive_wrap_key(secret: &ContentSecret, salt: &[u8]) -> Result<WrapKey> {
    if salt.len() < MIN_SALT_LEN {
        return Err(SealnoteError::Derivation);
    }

    let mut bytes = [0u8; WRAP_KEY_LEN];
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, PBKDF2_ITERATIONS, &mut bytes);
    Ok(WrapKey { bytes })
}

/// Generate a fresh random 16-byte salt from the OS CSPRNG.
///
/// Called once at registration for the account salt (immutable after
/// creation) and on every note write for the wrap salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}
