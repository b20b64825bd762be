use crate::{
    api::{ApiError, RecordId},
    cli::actions::{connect, print_json},
    config::AppConfig,
    features::entries::{self, EntryDraft, UploadQueue},
    session::require_session,
};
use anyhow::{bail, Result};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug)]
pub enum Command {
    List {
        project: Option<RecordId>,
    },
    Show {
        id: RecordId,
    },
    Create {
        project: RecordId,
        fields: Map<String, Value>,
        attachments: Vec<PathBuf>,
    },
    Update {
        id: RecordId,
        project: Option<RecordId>,
        fields: Map<String, Value>,
        attachments: Vec<PathBuf>,
    },
    Delete {
        id: RecordId,
    },
}

#[derive(Debug)]
pub struct Args {
    pub config: AppConfig,
    pub command: Command,
}

/// Execute a data entry command.
/// # Errors
/// Returns an error if not signed in, an upload fails or the backend refuses.
pub async fn execute(args: Args) -> Result<()> {
    let (client, sessions) = connect(&args.config)?;

    match args.command {
        Command::List { project } => {
            print_json(&entries::list_entries(&client, &sessions, project.as_ref()).await?)
        }
        Command::Show { id } => print_json(&entries::get_entry(&client, &sessions, &id).await?),
        Command::Create {
            project,
            fields,
            attachments,
        } => {
            let session = require_session(&sessions)?;
            let mut uploads = UploadQueue::new(client.clone(), session.token);
            attach_all(&mut uploads, attachments);

            let draft = EntryDraft::new(Some(project), fields);
            let result =
                entries::submit_entry(&client, &sessions, &mut uploads, None, draft).await;
            print_json(&submitted(result)?)
        }
        Command::Update {
            id,
            project,
            fields,
            attachments,
        } => {
            let session = require_session(&sessions)?;
            let mut uploads = UploadQueue::new(client.clone(), session.token);
            attach_all(&mut uploads, attachments);

            let draft = EntryDraft::new(project, fields);
            let result =
                entries::submit_entry(&client, &sessions, &mut uploads, Some(&id), draft).await;
            print_json(&submitted(result)?)
        }
        Command::Delete { id } => {
            let message = entries::delete_entry(&client, &sessions, &id).await?;
            print_json(&json!({
                "id": id,
                "message": message.unwrap_or_else(|| "Entry deleted.".to_string())
            }))
        }
    }
}

fn attach_all(uploads: &mut UploadQueue, attachments: Vec<PathBuf>) {
    for path in attachments {
        let id = uploads.attach(path);
        info!("queued upload {id}");
    }
}

fn submitted<T>(result: Result<T, ApiError>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(ApiError::Uploads(failures)) => {
            for failure in &failures {
                eprintln!("error: {} ({})", failure.file, failure.message);
            }
            bail!(ApiError::Uploads(failures))
        }
        Err(err) => Err(err.into()),
    }
}
