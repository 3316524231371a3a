//! Domain services over the storage and crypto layers.
//!
//! - **accounts**: registration, login, lockout enforcement
//! - **notes**: envelope-encrypted note CRUD and listings
//!
//! Services are stateless aside from the repositories they hold; the
//! caller supplies the content secret per request and owns it for the
//! life of that request.

pub mod accounts;
pub mod notes;

pub use accounts::{AccountService, LoginSession};
pub use notes::NoteService;
