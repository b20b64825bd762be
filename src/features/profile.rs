//! Signed-in user's own profile. Every call that returns a user refreshes the
//! stored session so the cached record never lags behind the server.

use crate::{
    api::{ApiClient, ApiError, ValidationError},
    features::auth::{validation::validate_new_password, UserRecord},
    session::{require_session, SessionRepository},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, instrument};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest<'a> {
    current_password: &'a str,
    new_password: &'a str,
    confirm_password: &'a str,
}

/// Fetches the profile and stores it as the session user.
///
/// # Errors
/// Returns `ApiError::Unauthenticated` without a session, or any backend error.
#[instrument(skip(client, sessions))]
pub async fn fetch_profile<R: SessionRepository + ?Sized>(
    client: &ApiClient,
    sessions: &R,
) -> Result<UserRecord, ApiError> {
    let session = require_session(sessions)?;
    let envelope = client
        .get(&client.endpoints().profile, Some(&session.token))
        .await?;

    let profile = envelope
        .user_value()
        .or(envelope.data.as_ref())
        .cloned()
        .ok_or_else(|| ApiError::Unexpected("Response is missing the profile".to_string()))?;

    let mut user = session.user;
    merge_user(&mut user, &profile)?;
    sessions.set(&session.token, &user)?;
    Ok(user)
}

/// Sends a partial profile update and merges the result into the session user.
///
/// # Errors
/// Returns `ValidationError::Invalid` for an empty update, or any backend error.
#[instrument(skip(client, sessions, fields))]
pub async fn update_profile<R: SessionRepository + ?Sized>(
    client: &ApiClient,
    sessions: &R,
    fields: &Map<String, Value>,
) -> Result<UserRecord, ApiError> {
    if fields.is_empty() {
        return Err(ValidationError::Invalid("Nothing to update.".to_string()).into());
    }

    let session = require_session(sessions)?;
    let envelope = client
        .put_json(&client.endpoints().profile, fields, Some(&session.token))
        .await?;

    let mut user = session.user;
    merge_user(&mut user, &Value::Object(fields.clone()))?;
    if let Some(updated) = envelope.user_value().or(envelope.data.as_ref()) {
        merge_user(&mut user, updated)?;
    }
    sessions.set(&session.token, &user)?;

    info!("profile updated");
    Ok(user)
}

/// Changes the password of the signed-in user. The new password must meet the
/// same strength rules as the onboarding reset.
///
/// # Errors
/// Returns a `ValidationError` before any request is made, or any backend error.
#[instrument(skip_all)]
pub async fn change_password<R: SessionRepository + ?Sized>(
    client: &ApiClient,
    sessions: &R,
    current_password: &SecretString,
    new_password: &SecretString,
    confirm_password: &SecretString,
) -> Result<Option<String>, ApiError> {
    if current_password.expose_secret().is_empty() {
        return Err(ValidationError::MissingField("Current password").into());
    }
    validate_new_password(new_password.expose_secret(), confirm_password.expose_secret())?;

    let session = require_session(sessions)?;
    let request = ChangePasswordRequest {
        current_password: current_password.expose_secret(),
        new_password: new_password.expose_secret(),
        confirm_password: confirm_password.expose_secret(),
    };
    let envelope = client
        .post_json(&client.endpoints().change_password, &request, Some(&session.token))
        .await?;

    if let Some(token) = envelope.token.as_deref().filter(|token| !token.is_empty()) {
        sessions.set(&SecretString::from(token.to_string()), &session.user)?;
    }

    info!("password changed");
    Ok(envelope.message)
}

fn merge_user(user: &mut UserRecord, update: &Value) -> Result<(), ApiError> {
    user.merge(update)
        .map_err(|err| ApiError::Unexpected(format!("Failed to merge profile: {err}")))
}
