//! Client wrappers for the login and onboarding endpoints. Each call returns a
//! normalized outcome so the wizard checks one shape only. Passwords, codes
//! and tokens are never logged.

use super::types::{
    AdminLoginRequest, Credentials, LoginOutcome, PasswordResetOutcome,
    ProjectManagerLoginRequest, Role, TemporaryPasswordRequest, UserFlags, UserRecord,
    VerificationOutcome, VerifyEmailRequest,
};
use crate::api::{errors::DEFAULT_LOGIN_ERROR, ApiClient, ApiError, Envelope};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

/// Submits credentials to the role's login endpoint.
///
/// # Errors
/// Returns `ApiError::Authentication` when the server rejects the login or the
/// response lacks `success`, `token` or a user object; transport errors are
/// returned as-is.
#[instrument(skip(client, credentials))]
pub async fn login(
    client: &ApiClient,
    role: Role,
    credentials: &Credentials,
) -> Result<LoginOutcome, ApiError> {
    let password = credentials.password.expose_secret();
    let response = match role {
        Role::SuperAdmin => {
            let request = AdminLoginRequest {
                email: &credentials.email,
                password,
            };
            client
                .post_json(&client.endpoints().admin_login, &request, None)
                .await
        }
        Role::ProjectManager => {
            let request = ProjectManagerLoginRequest {
                login_id: &credentials.email,
                password,
            };
            client
                .post_json(&client.endpoints().project_manager_login, &request, None)
                .await
        }
    };

    let envelope = response.map_err(|err| {
        if matches!(err, ApiError::Rejected { .. }) {
            ApiError::Authentication(err.message_or(DEFAULT_LOGIN_ERROR))
        } else {
            err
        }
    })?;

    parse_login(role, envelope)
}

fn parse_login(role: Role, envelope: Envelope) -> Result<LoginOutcome, ApiError> {
    let rejected = || {
        ApiError::Authentication(
            envelope
                .failure_message()
                .unwrap_or_else(|| DEFAULT_LOGIN_ERROR.to_string()),
        )
    };

    if !envelope.is_success() {
        return Err(rejected());
    }
    let token = envelope
        .token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(rejected)?;
    let user = envelope.user_value().cloned().ok_or_else(rejected)?;
    let user: UserRecord = serde_json::from_value(user)
        .map_err(|err| ApiError::Unexpected(format!("Failed to decode user: {err}")))?;

    debug!(
        "login accepted for {} (email_verified={}, temporal_password={})",
        role, user.email_verified, user.temporal_password
    );

    Ok(LoginOutcome {
        role,
        token: SecretString::from(token.to_string()),
        user,
        message: envelope.message.clone(),
    })
}

/// Submits the 6-digit email verification code.
///
/// # Errors
/// Returns `ApiError::Rejected` when the code is refused, or a transport error.
#[instrument(skip(client, token, code))]
pub async fn verify_email(
    client: &ApiClient,
    token: &SecretString,
    code: &str,
) -> Result<VerificationOutcome, ApiError> {
    let request = VerifyEmailRequest {
        verification_code: code,
    };
    let envelope = client
        .post_json(&client.endpoints().verify_email, &request, Some(token))
        .await?;

    if !envelope.is_success() {
        return Err(ApiError::Rejected {
            status: None,
            message: envelope.failure_message(),
        });
    }

    let flags = match envelope.user_value() {
        Some(user) => serde_json::from_value::<UserFlags>(user.clone())
            .map_err(|err| ApiError::Unexpected(format!("Failed to decode user flags: {err}")))?,
        None => UserFlags::default(),
    };

    Ok(VerificationOutcome {
        flags,
        message: envelope.message,
    })
}

/// Asks the backend to send a fresh verification code.
///
/// # Errors
/// Returns `ApiError::Rejected` when the server refuses, or a transport error.
#[instrument(skip(client, token))]
pub async fn resend_verification_code(
    client: &ApiClient,
    token: &SecretString,
) -> Result<Option<String>, ApiError> {
    let envelope = client
        .post_json(
            &client.endpoints().resend_verification,
            &serde_json::json!({}),
            Some(token),
        )
        .await?;
    Ok(envelope.message)
}

/// Replaces the temporary password.
///
/// # Errors
/// Returns `ApiError::Rejected` when the server refuses, or a transport error.
#[instrument(skip(client, token, new_password, confirm_password))]
pub async fn change_temporary_password(
    client: &ApiClient,
    token: &SecretString,
    new_password: &SecretString,
    confirm_password: &SecretString,
) -> Result<PasswordResetOutcome, ApiError> {
    let request = TemporaryPasswordRequest {
        new_password: new_password.expose_secret(),
        confirm_password: confirm_password.expose_secret(),
    };
    let envelope = client
        .post_json(&client.endpoints().temporary_password, &request, Some(token))
        .await?;

    if !envelope.is_success() {
        return Err(ApiError::Rejected {
            status: None,
            message: envelope.failure_message(),
        });
    }

    let user = envelope.user_value().cloned();
    Ok(PasswordResetOutcome {
        token: envelope
            .token
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from),
        user,
        message: envelope.message,
    })
}
