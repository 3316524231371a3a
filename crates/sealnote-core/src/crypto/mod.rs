//! Cryptographic operations for Sealnote.
//!
//! This module provides the credential and envelope-encryption subsystem
//! using well-audited RustCrypto implementations:
//! - **Argon2id**: memory-hard derivation of the content secret
//! - **scrypt**: storage credential hashing (hash of the derived secret)
//! - **PBKDF2-HMAC-SHA256**: per-note wrapping-key derivation
//! - **AES-CBC-PKCS7**: header, content, and data-key encryption
//!
//! ## Security Model
//!
//! - The content secret is reproducible from password + account salt, but
//!   never persisted; it exists only for the duration of a call.
//! - The stored credential is a one-way re-hash of the content secret;
//!   neither the password nor the secret can be recovered from storage.
//! - Each note version gets a fresh random data key, IV, and wrap salt.
//! - Secret material is zeroized from memory on drop.
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the encrypted note database
//! - A curious storage layer or administrator reading note plaintext
//! - Offline brute-force against stored credentials
//!
//! We do NOT defend against:
//! - A compromised host reading secrets out of a live request
//! - Weak user passwords

pub mod credential;
pub mod envelope;
pub mod kdf;

pub use credential::{register_credential, verify_credential};
pub use envelope::{open, open_header, seal, EnvelopeRecord};
pub use kdf::{derive_content_secret, generate_salt, ContentSecret};
