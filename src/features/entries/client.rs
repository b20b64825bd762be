//! Data entry CRUD and statistics.

use super::{
    types::{DataEntry, EntryDraft, EntryStats},
    uploads::UploadQueue,
};
use crate::{
    api::{ApiClient, ApiError, RecordId, ValidationError},
    session::{require_session, SessionRepository},
};
use secrecy::SecretString;
use tracing::{debug, info, instrument};
use url::form_urlencoded;

/// # Errors
/// Returns `ApiError::Unauthenticated` without a session, or any backend error.
#[instrument(skip(client, sessions))]
pub async fn list_entries<R: SessionRepository + ?Sized>(
    client: &ApiClient,
    sessions: &R,
    project: Option<&RecordId>,
) -> Result<Vec<DataEntry>, ApiError> {
    let session = require_session(sessions)?;
    let path = match project {
        Some(project) => {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("project_id", &project.to_string())
                .finish();
            format!("{}?{query}", client.endpoints().entries)
        }
        None => client.endpoints().entries.clone(),
    };

    let envelope = client.get(&path, Some(&session.token)).await?;
    let entries: Vec<DataEntry> = envelope.record_as("entries")?;
    debug!("fetched {} entries", entries.len());
    Ok(entries)
}

/// # Errors
/// Returns `ApiError::Unauthenticated` without a session, or any backend error.
#[instrument(skip(client, sessions))]
pub async fn get_entry<R: SessionRepository + ?Sized>(
    client: &ApiClient,
    sessions: &R,
    id: &RecordId,
) -> Result<DataEntry, ApiError> {
    let session = require_session(sessions)?;
    let envelope = client
        .get(&client.endpoints().entry(&id.to_string())?, Some(&session.token))
        .await?;
    envelope.record_as("entry")
}

/// # Errors
/// Returns `ValidationError::MissingField` without a project, or any backend error.
#[instrument(skip(client, sessions, draft))]
pub async fn create_entry<R: SessionRepository + ?Sized>(
    client: &ApiClient,
    sessions: &R,
    draft: &EntryDraft,
) -> Result<DataEntry, ApiError> {
    if draft.project_id.is_none() {
        return Err(ValidationError::MissingField("Project").into());
    }

    let session = require_session(sessions)?;
    let envelope = client
        .post_json(&client.endpoints().entries, &draft.to_payload(), Some(&session.token))
        .await?;
    let entry: DataEntry = envelope.record_as("entry")?;

    info!(
        "created entry {}",
        entry.id.as_ref().map_or_else(|| "?".to_string(), ToString::to_string)
    );
    Ok(entry)
}

/// # Errors
/// Returns `ApiError::Unauthenticated` without a session, or any backend error.
#[instrument(skip(client, sessions, draft))]
pub async fn update_entry<R: SessionRepository + ?Sized>(
    client: &ApiClient,
    sessions: &R,
    id: &RecordId,
    draft: &EntryDraft,
) -> Result<DataEntry, ApiError> {
    let session = require_session(sessions)?;
    let envelope = client
        .put_json(
            &client.endpoints().entry(&id.to_string())?,
            &draft.to_payload(),
            Some(&session.token),
        )
        .await?;

    info!("updated entry {}", id);
    // Some deployments answer updates with a bare message.
    if envelope.data.is_none() && !envelope.extra.contains_key("entry") {
        return Ok(DataEntry {
            id: Some(id.clone()),
            ..DataEntry::default()
        });
    }
    envelope.record_as("entry")
}

/// # Errors
/// Returns `ApiError::Unauthenticated` without a session, or any backend error.
#[instrument(skip(client, sessions))]
pub async fn delete_entry<R: SessionRepository + ?Sized>(
    client: &ApiClient,
    sessions: &R,
    id: &RecordId,
) -> Result<Option<String>, ApiError> {
    let session = require_session(sessions)?;
    let envelope = client
        .delete(&client.endpoints().entry(&id.to_string())?, Some(&session.token))
        .await?;
    info!("deleted entry {}", id);
    Ok(envelope.message)
}

/// # Errors
/// Returns `ApiError::Unauthenticated` without a session, or any backend error.
pub async fn fetch_stats<R: SessionRepository + ?Sized>(
    client: &ApiClient,
    sessions: &R,
) -> Result<EntryStats, ApiError> {
    let session = require_session(sessions)?;
    fetch_stats_with_token(client, &session.token).await
}

#[instrument(skip_all)]
pub(crate) async fn fetch_stats_with_token(
    client: &ApiClient,
    token: &SecretString,
) -> Result<EntryStats, ApiError> {
    let envelope = client.get(&client.endpoints().entry_stats, Some(token)).await?;
    envelope.record_as("stats")
}

/// Settles `uploads`, then creates or updates the entry with every uploaded
/// file attached. Nothing is submitted while any upload has failed.
///
/// # Errors
/// Returns `ApiError::Uploads` listing failed files, or any backend error.
pub async fn submit_entry<R: SessionRepository + ?Sized>(
    client: &ApiClient,
    sessions: &R,
    uploads: &mut UploadQueue,
    existing: Option<&RecordId>,
    mut draft: EntryDraft,
) -> Result<DataEntry, ApiError> {
    let media = uploads.settle().await?;
    draft.media.extend(media);

    match existing {
        Some(id) => update_entry(client, sessions, id, &draft).await,
        None => create_entry(client, sessions, &draft).await,
    }
}
