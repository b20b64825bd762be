//! Projects visible to the signed-in user.

use crate::{
    api::{ApiClient, ApiError, RecordId},
    session::{require_session, SessionRepository},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// # Errors
/// Returns `ApiError::Unauthenticated` without a session, or any backend error.
pub async fn list_projects<R: SessionRepository + ?Sized>(
    client: &ApiClient,
    sessions: &R,
) -> Result<Vec<Project>, ApiError> {
    let session = require_session(sessions)?;
    fetch_projects(client, &session.token).await
}

/// # Errors
/// Returns `ApiError::Unauthenticated` without a session, or any backend error.
#[instrument(skip(client, sessions))]
pub async fn get_project<R: SessionRepository + ?Sized>(
    client: &ApiClient,
    sessions: &R,
    id: &RecordId,
) -> Result<Project, ApiError> {
    let session = require_session(sessions)?;
    let envelope = client
        .get(&client.endpoints().project(&id.to_string())?, Some(&session.token))
        .await?;
    envelope.record_as("project")
}

#[instrument(skip_all)]
pub(crate) async fn fetch_projects(
    client: &ApiClient,
    token: &SecretString,
) -> Result<Vec<Project>, ApiError> {
    let envelope = client.get(&client.endpoints().projects, Some(token)).await?;
    let projects: Vec<Project> = envelope.record_as("projects")?;
    debug!("fetched {} projects", projects.len());
    Ok(projects)
}
