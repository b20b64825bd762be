use crate::{
    api::RecordId,
    cli::actions::{connect, print_json},
    config::AppConfig,
    features::projects,
};
use anyhow::Result;

#[derive(Debug)]
pub enum Command {
    List,
    Show { id: RecordId },
}

#[derive(Debug)]
pub struct Args {
    pub config: AppConfig,
    pub command: Command,
}

/// Execute a project command.
/// # Errors
/// Returns an error if not signed in or the backend refuses.
pub async fn execute(args: Args) -> Result<()> {
    let (client, sessions) = connect(&args.config)?;

    match args.command {
        Command::List => print_json(&projects::list_projects(&client, &sessions).await?),
        Command::Show { id } => print_json(&projects::get_project(&client, &sessions, &id).await?),
    }
}
