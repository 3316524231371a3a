//! Sealnote CLI - an encrypted multi-user note store.
//!
//! The CLI plays the role of the transport layer: it collects the
//! password, derives the per-invocation content secret through login,
//! and hands it to the core services. Nothing the database stores can
//! be read without it.

mod cli;
mod commands;
mod output;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use sealnote_core::config::{LockoutConfig, NoteLimits};
use sealnote_core::service::{AccountService, NoteService};
use sealnote_core::storage::SqliteStore;

use cli::{Cli, Commands};
use commands::App;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let Some(email) = args.email.clone() else {
        bail!("an account email is required (--email or SEALNOTE_EMAIL)");
    };

    let store = Arc::new(
        SqliteStore::open(Path::new(&args.db))
            .with_context(|| format!("failed to open database at {}", args.db))?,
    );

    let app = App {
        accounts: AccountService::new(store.clone(), LockoutConfig::default()),
        notes: NoteService::new(store, NoteLimits::default()),
        email,
        json: args.json,
    };

    match args.command {
        Commands::Register { admin } => app.register(admin),
        Commands::Status => app.status(),
        Commands::Add { header, content } => app.add(&header, content),
        Commands::List { all } => app.list(all),
        Commands::Show { id } => app.show(&id),
        Commands::Edit {
            id,
            header,
            content,
        } => app.edit(&id, &header, &content),
        Commands::Delete { id } => app.delete(&id),
    }
}
