pub mod account;
pub mod auth;
pub mod dashboard;
pub mod entries;
pub mod projects;
pub mod session;

mod prompt;

// Internal "interpreter" for `Action`.
// We keep the match in a separate module so `mod.rs` stays small as more actions are added.
mod run;

use crate::{api::ApiClient, config::AppConfig, session::FileSessionStore};
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug)]
pub enum Action {
    Auth(auth::Args),
    Session(session::Args),
    Account(account::Args),
    Projects(projects::Args),
    Entries(entries::Args),
    Dashboard(dashboard::Args),
}

impl Action {
    // Convenience wrapper so call sites can do `action.execute().await`.
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        run::execute(self).await
    }
}

/// HTTP client and session store for a resolved configuration.
pub(crate) fn connect(config: &AppConfig) -> Result<(ApiClient, FileSessionStore)> {
    let client = ApiClient::from_config(config).context("failed to build HTTP client")?;
    Ok((client, FileSessionStore::open(config.session_file.clone())))
}

/// Command results go to stdout as pretty JSON; logs stay on stderr.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
