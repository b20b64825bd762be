//! Error taxonomy shared by every backend call. Step logic only ever sees
//! `ApiError`; transport and envelope details are folded in at the client
//! boundary.

use crate::{features::auth::validation::PasswordRequirement, session::SessionError};
use thiserror::Error;

/// Message shown when the server rejects a login without saying why.
pub const DEFAULT_LOGIN_ERROR: &str = "Login failed. Please check your credentials.";
/// Message shown when no response was received at all.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Unable to reach the server. Please check your connection and try again.";
/// Fallback for failures that are neither validation nor server rejections.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";
/// Fallback when the server rejects a request without a message.
pub const DEFAULT_REJECTION_MESSAGE: &str = "Request failed.";

/// Local, pre-submission failures. These never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Verification code must be exactly 6 digits.")]
    InvalidCode,
    #[error("Password must contain {}.", describe_requirements(.0))]
    WeakPassword(Vec<PasswordRequirement>),
    #[error("Passwords do not match.")]
    PasswordMismatch,
    #[error("{0} is required.")]
    MissingField(&'static str),
    #[error("{0}")]
    Invalid(String),
}

/// One media file that could not be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
    pub file: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Authentication(String),
    #[error("{}", .message.as_deref().unwrap_or(DEFAULT_REJECTION_MESSAGE))]
    Rejected {
        status: Option<u16>,
        message: Option<String>,
    },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out. Please try again.")]
    Timeout,
    #[error("Not signed in. Run `legasi login` first.")]
    Unauthenticated,
    #[error("Onboarding is not complete: {0} is still pending.")]
    OnboardingIncomplete(&'static str),
    #[error("{}", describe_upload_failures(.0))]
    Uploads(Vec<UploadFailure>),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// Text to display in place, preferring what the server said and falling
    /// back to `default` when a rejection carried no message.
    #[must_use]
    pub fn message_or(&self, default: &str) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            }
            | Self::Authentication(message) => message.clone(),
            Self::Rejected { message: None, .. } => default.to_string(),
            Self::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            Self::Unexpected(_) | Self::Session(_) => UNEXPECTED_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Display text with the generic rejection fallback.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.message_or(DEFAULT_REJECTION_MESSAGE)
    }

    /// HTTP status of a server rejection, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => *status,
            _ => None,
        }
    }
}

fn describe_requirements(missing: &[PasswordRequirement]) -> String {
    missing
        .iter()
        .map(|requirement| requirement.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_upload_failures(failures: &[UploadFailure]) -> String {
    let files = failures
        .iter()
        .map(|failure| format!("{} ({})", failure.file, failure.message))
        .collect::<Vec<_>>()
        .join("; ");
    format!("{} upload(s) failed: {files}", failures.len())
}
