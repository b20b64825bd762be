use crate::{
    cli::actions::print_json,
    features::auth::{self, GatePolicy, Role},
    session::{FileSessionStore, SessionRepository},
};
use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Command {
    Logout,
    Whoami,
}

/// Local session commands; these never contact the backend.
#[derive(Debug)]
pub struct Args {
    pub session_file: PathBuf,
    pub gate_policy: GatePolicy,
    pub command: Command,
}

/// Execute a local session command.
/// # Errors
/// Returns an error if the session file cannot be read or removed.
pub fn execute(args: &Args) -> Result<()> {
    let sessions = FileSessionStore::open(args.session_file.clone());

    match args.command {
        Command::Logout => {
            auth::logout(&sessions)?;
            print_json(&json!({ "message": "Signed out." }))
        }
        Command::Whoami => {
            let Some(session) = sessions.get()? else {
                return print_json(&json!({ "signed_in": false }));
            };

            let role = session.user.parsed_role();
            let step = args
                .gate_policy
                .gate(role.unwrap_or(Role::ProjectManager), &session.user);
            print_json(&json!({
                "signed_in": true,
                "name": session.user.display_name(),
                "role": role,
                "step": step.name(),
                "redirect": step.redirect(),
                "user": session.user,
            }))
        }
    }
}
