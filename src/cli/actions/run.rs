use crate::cli::actions::{account, auth, dashboard, entries, projects, session, Action};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Auth(args) => auth::execute(args).await,
        Action::Session(args) => session::execute(&args),
        Action::Account(args) => account::execute(args).await,
        Action::Projects(args) => projects::execute(args).await,
        Action::Entries(args) => entries::execute(args).await,
        Action::Dashboard(args) => dashboard::execute(args).await,
    }
}
