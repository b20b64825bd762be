//! HTTP client for the LEGASI DMS backend with a single timeout policy and one
//! error shape. Feature modules build on [`ApiClient`] instead of touching
//! `reqwest` directly. The client never stores tokens; callers pass the bearer
//! token per request and it is never logged.

pub mod endpoints;
pub mod envelope;
pub mod errors;
mod record_id;

pub use self::{
    endpoints::Endpoints,
    envelope::Envelope,
    errors::{ApiError, UploadFailure, ValidationError},
    record_id::RecordId,
};

use crate::{config::AppConfig, APP_USER_AGENT};
use reqwest::{multipart::Form, Client, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::{debug, instrument, warn};
use ulid::Ulid;

/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

enum Payload {
    Empty,
    Json(Value),
    Multipart(Form),
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    endpoints: Arc<Endpoints>,
}

impl ApiClient {
    /// Builds a client for `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    /// Returns `ApiError::Unexpected` if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration, endpoints: Endpoints) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Unexpected(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            endpoints: Arc::new(endpoints),
        })
    }

    /// # Errors
    /// Returns `ApiError::Unexpected` if the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::new(
            config.api_base_url.as_str(),
            config.timeout,
            config.endpoints.clone(),
        )
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Absolute URL for an endpoint path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        build_url_with_base(&self.base_url, path)
    }

    /// # Errors
    /// Returns an `ApiError` on transport failure or server rejection.
    pub async fn get(&self, path: &str, token: Option<&SecretString>) -> Result<Envelope, ApiError> {
        self.send(Method::GET, path, token, Payload::Empty).await
    }

    /// # Errors
    /// Returns an `ApiError` on encoding failure, transport failure or server rejection.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: Option<&SecretString>,
    ) -> Result<Envelope, ApiError> {
        self.send(Method::POST, path, token, Payload::Json(encode(body)?))
            .await
    }

    /// # Errors
    /// Returns an `ApiError` on encoding failure, transport failure or server rejection.
    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: Option<&SecretString>,
    ) -> Result<Envelope, ApiError> {
        self.send(Method::PUT, path, token, Payload::Json(encode(body)?))
            .await
    }

    /// # Errors
    /// Returns an `ApiError` on transport failure or server rejection.
    pub async fn delete(&self, path: &str, token: Option<&SecretString>) -> Result<Envelope, ApiError> {
        self.send(Method::DELETE, path, token, Payload::Empty).await
    }

    /// # Errors
    /// Returns an `ApiError` on transport failure or server rejection.
    pub async fn post_multipart(
        &self,
        path: &str,
        form: Form,
        token: Option<&SecretString>,
    ) -> Result<Envelope, ApiError> {
        self.send(Method::POST, path, token, Payload::Multipart(form))
            .await
    }

    #[instrument(skip(self, token, payload), fields(request_id = tracing::field::Empty))]
    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
        payload: Payload,
    ) -> Result<Envelope, ApiError> {
        let url = self.url(path);
        let request_id = Ulid::new().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header("X-Request-Id", request_id.as_str());

        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }

        builder = match payload {
            Payload::Empty => builder,
            Payload::Json(body) => builder.json(&body),
            Payload::Multipart(form) => builder.multipart(form),
        };

        debug!("sending {} {}", method, url);

        let response = builder.send().await.map_err(map_request_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_request_error)?;

        let result = handle_response(status, &body);
        match &result {
            Ok(_) => debug!("{} {} -> {}", method, path, status),
            Err(err) => warn!("{} {} -> {}: {}", method, path, status, err),
        }
        result
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|err| ApiError::Unexpected(format!("Failed to encode request: {err}")))
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Maps transport errors into `ApiError`, keeping timeouts apart from other
/// no-response failures.
fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_decode() || err.is_body() {
        ApiError::Unexpected(format!("Failed to read response: {err}"))
    } else {
        ApiError::Network(err.to_string())
    }
}

/// Normalizes a received response: non-2xx statuses and explicit failure
/// envelopes become `ApiError::Rejected`, everything else an `Envelope`.
pub(crate) fn handle_response(status: StatusCode, body: &str) -> Result<Envelope, ApiError> {
    let parsed = if body.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str::<Value>(body)
    };

    if !status.is_success() {
        let message = match parsed {
            Ok(value) => Envelope::from_value(value)
                .ok()
                .and_then(|envelope| envelope.failure_message()),
            Err(_) => sanitize_body(body),
        };
        return Err(ApiError::Rejected {
            status: Some(status.as_u16()),
            message,
        });
    }

    let value =
        parsed.map_err(|err| ApiError::Unexpected(format!("Failed to decode response: {err}")))?;
    let envelope = Envelope::from_value(value)?;

    if envelope.is_failure() {
        return Err(ApiError::Rejected {
            status: Some(status.as_u16()),
            message: envelope.failure_message(),
        });
    }

    Ok(envelope)
}

/// Trims and truncates non-JSON error bodies for display.
fn sanitize_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_ERROR_CHARS).collect())
    }
}
