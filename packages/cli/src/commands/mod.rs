pub mod init;
pub mod pages;
pub mod publish;
pub mod sections;

pub use init::{init, InitArgs};
pub use pages::{delete, list, new, restore, show, DeleteArgs, NewArgs, RestoreArgs, ShowArgs};
pub use publish::{publish, unpublish, PublishArgs, UnpublishArgs};
pub use sections::{add, move_section, remove, set, AddArgs, MoveArgs, RemoveArgs, SetArgs};

use crate::config::Config;
use anyhow::{anyhow, Result};
use colored::Colorize;
use pagecraft_common::{FileDocumentStore, FileLocalStore, UserId};
use pagecraft_editor::{EditSession, Severity};
use std::sync::Arc;

/// Everything a command needs to open sessions
pub struct Context {
    pub cwd: String,
    pub config: Config,
    pub user: UserId,
}

impl Context {
    /// Resolve config and acting user for `cwd`
    ///
    /// The user comes from `--user`/`PAGECRAFT_USER`, then the config file.
    pub fn load(cwd: &str, user: Option<String>) -> Result<Self> {
        let config = Config::load(cwd)?;
        let user = user
            .or_else(|| config.user.clone())
            .ok_or_else(|| anyhow!("No user given. Pass --user or set PAGECRAFT_USER"))?;

        Ok(Self {
            cwd: cwd.to_string(),
            config,
            user: UserId::new(user),
        })
    }

    pub fn session(&self) -> EditSession {
        let store = FileDocumentStore::new(self.config.get_store_dir(&self.cwd));
        let local = FileLocalStore::new(self.config.get_local_store_path(&self.cwd));

        EditSession::new(
            self.user.clone(),
            Arc::new(store),
            Arc::new(local),
            self.config.editor.clone(),
        )
    }

    /// Open a session on `page`, pointing out any newer local backup
    pub async fn open(&self, page: &str) -> Result<EditSession> {
        let mut session = self.session();
        let offer = session.load(page).await?;

        if let Some(offer) = offer {
            println!(
                "{} A local backup from {} is newer than the stored page. Run `pagecraft restore {}` to recover it.",
                "⚠️".yellow(),
                offer.saved_at.format("%Y-%m-%d %H:%M:%S"),
                page
            );
        }
        session.drain_notifications();
        Ok(session)
    }
}

/// Print notices the session raised; errors are reported by `main`
pub fn report(session: &mut EditSession) {
    for notice in session.drain_notifications() {
        match notice.severity {
            Severity::Success => println!("  {} {}", "✓".green(), notice.message),
            Severity::Info => println!("  {} {}", "ℹ".bright_blue(), notice.message),
            Severity::Warning => println!("  {} {}", "⚠️".yellow(), notice.message),
            Severity::Error => {}
        }
    }
}
