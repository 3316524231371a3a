//! Command handlers.
//!
//! Every authenticated command logs in fresh: the content secret is
//! re-derived from the password for the life of one invocation and
//! dropped (zeroized) when the handler returns, mirroring the
//! per-request secret the core expects from any transport.

use std::io::Read;

use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use dialoguer::Password;
use sealnote_core::service::{AccountService, LoginSession, NoteService};
use sealnote_core::storage::Role;
use uuid::Uuid;

use crate::output;

pub struct App {
    pub accounts: AccountService,
    pub notes: NoteService,
    pub email: String,
    pub json: bool,
}

impl App {
    fn login(&self) -> anyhow::Result<LoginSession> {
        let password = Password::new()
            .with_prompt(format!("Password for {}", self.email))
            .interact()
            .context("failed to read password")?;

        self.accounts
            .login(&self.email, &password, Utc::now())
            .map_err(|e| anyhow!("{e}"))
    }

    pub fn register(&self, admin: bool) -> anyhow::Result<()> {
        let password = Password::new()
            .with_prompt(format!("New password for {}", self.email))
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()
            .context("failed to read password")?;

        let mut roles = vec![Role::User];
        if admin {
            roles.push(Role::Admin);
        }

        let account = self
            .accounts
            .register(&self.email, &password, roles)
            .map_err(|e| anyhow!("{e}"))?;
        println!("Registered {} ({})", account.email, account.id);
        Ok(())
    }

    pub fn status(&self) -> anyhow::Result<()> {
        match self.accounts.lock_status(&self.email) {
            Ok(Some(until)) if until > Utc::now() => {
                println!("{}: locked until {}", self.email, until.to_rfc3339());
            }
            Ok(_) => println!("{}: not locked", self.email),
            Err(e) => bail!("{e}"),
        }
        Ok(())
    }

    pub fn add(&self, header: &str, content: Option<String>) -> anyhow::Result<()> {
        let content = match content {
            Some(content) => content,
            None => {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .context("failed to read content from stdin")?;
                buffer.trim_end().to_string()
            }
        };

        let session = self.login()?;
        let note = self
            .notes
            .create(session.account_id, header, &content, &session.secret)
            .map_err(|e| anyhow!("{e}"))?;
        println!("Created note {}", note.id);
        Ok(())
    }

    pub fn list(&self, all: bool) -> anyhow::Result<()> {
        let session = self.login()?;

        let summaries = if all {
            if !session.roles.contains(&Role::Admin) {
                bail!("--all requires the admin role");
            }
            // Admin view: ciphertext headers only.
            self.notes.list_all_encrypted()
        } else {
            self.notes
                .list_for_owner(&session.account_id, &session.secret)
        }
        .map_err(|e| anyhow!("{e}"))?;

        output::print_summaries(&summaries, self.json)
    }

    pub fn show(&self, id: &str) -> anyhow::Result<()> {
        let id = parse_id(id)?;
        let session = self.login()?;
        let note = self
            .notes
            .get_decrypted(&id, &session.account_id, &session.secret)
            .map_err(|e| anyhow!("{e}"))?;
        output::print_note(&note, self.json)
    }

    pub fn edit(&self, id: &str, header: &str, content: &str) -> anyhow::Result<()> {
        let id = parse_id(id)?;
        let session = self.login()?;
        self.notes
            .update(&id, &session.account_id, header, content, &session.secret)
            .map_err(|e| anyhow!("{e}"))?;
        println!("Updated note {id}");
        Ok(())
    }

    pub fn delete(&self, id: &str) -> anyhow::Result<()> {
        let id = parse_id(id)?;
        let session = self.login()?;
        let is_admin = session.roles.contains(&Role::Admin);
        self.notes
            .delete(&id, &session.account_id, is_admin)
            .map_err(|e| anyhow!("{e}"))?;
        println!("Deleted note {id}");
        Ok(())
    }
}

fn parse_id(id: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(id).with_context(|| format!("'{id}' is not a valid note ID"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert!(parse_id("not-a-uuid").is_err());
        assert!(parse_id("9b2f1417-5b9c-4b85-a15a-2ac9edeb5a71").is_ok());
    }
}
