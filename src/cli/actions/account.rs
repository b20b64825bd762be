use crate::{
    cli::actions::{connect, print_json, prompt::Prompter},
    config::AppConfig,
    features::profile,
};
use anyhow::Result;
use secrecy::SecretString;
use serde_json::{json, Map, Value};

#[derive(Debug)]
pub enum Command {
    ProfileShow,
    ProfileUpdate {
        fields: Map<String, Value>,
    },
    PasswordChange {
        current_password: Option<SecretString>,
        new_password: Option<SecretString>,
        confirm_password: Option<SecretString>,
    },
}

#[derive(Debug)]
pub struct Args {
    pub config: AppConfig,
    pub command: Command,
}

/// Execute a profile command.
/// # Errors
/// Returns an error if not signed in, validation fails or the backend refuses.
pub async fn execute(args: Args) -> Result<()> {
    let (client, sessions) = connect(&args.config)?;

    match args.command {
        Command::ProfileShow => {
            let user = profile::fetch_profile(&client, &sessions).await?;
            print_json(&user)
        }
        Command::ProfileUpdate { fields } => {
            let user = profile::update_profile(&client, &sessions, &fields).await?;
            print_json(&user)
        }
        Command::PasswordChange {
            current_password,
            new_password,
            confirm_password,
        } => {
            let mut prompter = Prompter::new();
            let current_password = prompter
                .secret_or(current_password, "Current password: ")
                .await?;
            let new_password = prompter.secret_or(new_password, "New password: ").await?;
            let confirm_password = prompter
                .secret_or(confirm_password, "Confirm new password: ")
                .await?;

            let message = profile::change_password(
                &client,
                &sessions,
                &current_password,
                &new_password,
                &confirm_password,
            )
            .await?;
            print_json(&json!({
                "message": message.unwrap_or_else(|| "Password changed.".to_string())
            }))
        }
    }
}
