//! # Sealnote Core
//!
//! Core library for Sealnote - a multi-user note store whose note contents
//! stay unreadable to the storage layer and to administrators.
//!
//! This crate provides the cryptographic subsystem, domain services, and
//! storage abstractions independent of any transport. The caller (CLI, web
//! layer) is responsible for collecting the password and carrying the
//! derived content secret for the duration of a request.
//!
//! ## Architecture
//!
//! - **crypto**: key derivation, credential hashing, envelope encryption
//! - **lockout**: failed-login lockout state machine
//! - **storage**: repository traits and the SQLite backend
//! - **service**: account and note operations built on the above
//! - **validate**: input validation for registration and note payloads
//!
//! ## Security model
//!
//! One password yields two independent secrets: a reproducible 32-byte
//! content secret (used to decrypt notes, never persisted) and a one-way
//! storage credential (scrypt over the content secret, used only for login
//! verification). Notes are envelope-encrypted: a random per-note data key
//! encrypts header and content, and is itself wrapped under a key derived
//! from the content secret. Compromise of storage alone reveals neither
//! passwords nor plaintext.

pub mod config;
pub mod crypto;
pub mod error;
pub mod lockout;
pub mod service;
pub mod storage;
pub mod validate;

pub use error::{Result, SealnoteError};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
