//! Storage credential hashing.
//!
//! The login credential kept in storage is scrypt over the *derived
//! content secret*, never over the raw password. This decouples what is
//! durably stored for login from the secret that decrypts notes: the
//! stored material is a one-way hash-of-a-hash, so compromise of storage
//! alone cannot reconstruct either.
//!
//! scrypt is self-salting here: each credential embeds its own fresh
//! 16-byte salt in the emitted PHC string.

use scrypt::password_hash::rand_core::OsRng;
use scrypt::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use scrypt::Scrypt;

use crate::crypto::kdf::ContentSecret;
use crate::error::{Result, SealnoteError};

/// scrypt cost parameters: N = 2^17, r = 8, p = 1, 32-byte key,
/// per OWASP password storage guidance.
const SCRYPT_LOG_N: u8 = 17;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;
const SCRYPT_KEY_LEN: usize = 32;

fn scrypt_params() -> Result<scrypt::Params> {
    scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, SCRYPT_KEY_LEN)
        .map_err(|_| SealnoteError::Derivation)
}

/// Hash a content secret for storage.
///
/// Returns a PHC-format string with the salt and parameters embedded,
/// suitable for persisting as the account's stored credential.
pub fn register_credential(secret: &ContentSecret) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password_customized(secret.as_bytes(), None, None, scrypt_params()?, &salt)
        .map_err(|_| SealnoteError::Derivation)?;
    Ok(hash.to_string())
}

/// Verify a content secret against a stored credential.
///
/// Delegates the comparison to the scrypt implementation, which compares
/// digests in constant time. A wrong secret and a malformed stored
/// credential both verify as `false`; neither is an error path.
pub fn verify_credential(secret: &ContentSecret, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Scrypt.verify_password(secret.as_bytes(), &parsed).is_ok()
}
