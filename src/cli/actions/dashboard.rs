use crate::{
    api::ApiError,
    cli::actions::{connect, print_json},
    config::AppConfig,
    features::dashboard::load_dashboard,
};
use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug)]
pub struct Args {
    pub config: AppConfig,
}

fn section<T: Serialize>(result: Result<T, ApiError>) -> Value {
    match result {
        Ok(value) => serde_json::to_value(value)
            .unwrap_or_else(|err| json!({ "error": err.to_string() })),
        Err(err) => json!({ "error": err.user_message() }),
    }
}

/// Execute the dashboard action.
/// # Errors
/// Returns an error if not signed in or onboarding is not complete.
pub async fn execute(args: Args) -> Result<()> {
    let (client, sessions) = connect(&args.config)?;
    let snapshot = load_dashboard(&client, &sessions, &args.config.gate_policy).await?;

    print_json(&json!({
        "user": snapshot.user,
        "role": snapshot.role,
        "path": snapshot.path,
        "projects": section(snapshot.projects),
        "stats": section(snapshot.stats),
    }))
}
