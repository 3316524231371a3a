//! Command-line argument definitions.

use clap::{Parser, Subcommand};
use sealnote_core::VERSION;

/// Sealnote - an encrypted multi-user note store
#[derive(Parser)]
#[command(name = "sealnote")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the note database
    #[arg(short, long, global = true, env = "SEALNOTE_DB", default_value = "sealnote.db")]
    pub db: String,

    /// Account email; every command authenticates as this account
    #[arg(short, long, global = true, env = "SEALNOTE_EMAIL")]
    pub email: Option<String>,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a new account
    Register {
        /// Grant the admin role in addition to user
        #[arg(long)]
        admin: bool,
    },

    /// Show account status (roles, lockout window)
    Status,

    /// Add a new note
    Add {
        /// Note header
        #[arg(value_name = "HEADER")]
        header: String,

        /// Note content (read from stdin when omitted)
        #[arg(long)]
        content: Option<String>,
    },

    /// List notes (decrypted headers where possible)
    List {
        /// List every account's notes, ciphertext only (admin)
        #[arg(long)]
        all: bool,
    },

    /// Show one note, decrypted
    Show {
        /// Note ID
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Replace a note's header and content
    Edit {
        /// Note ID
        #[arg(value_name = "ID")]
        id: String,

        /// New header
        #[arg(long)]
        header: String,

        /// New content
        #[arg(long)]
        content: String,
    },

    /// Delete a note
    Delete {
        /// Note ID
        #[arg(value_name = "ID")]
        id: String,
    },
}
