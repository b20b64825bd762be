//! Response envelope used by the backend. Endpoints disagree on how they signal
//! success (`success: true` vs `status: "success"`), so both are folded into
//! one shape here and nowhere else.

use super::errors::ApiError;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Only string statuses are kept; numeric ones (`"status": 200`) read as absent.
    #[serde(
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// Builds an envelope from any JSON body. Bare arrays and scalars are
    /// treated as `data`.
    ///
    /// # Errors
    /// Returns `ApiError::Unexpected` if an object body has ill-typed envelope fields.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Object(_) => serde_json::from_value(value)
                .map_err(|err| ApiError::Unexpected(format!("Failed to decode response: {err}"))),
            Value::Null => Ok(Self::default()),
            other => Ok(Self {
                data: Some(other),
                ..Self::default()
            }),
        }
    }

    /// Explicit success, in either convention.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success == Some(true) || self.status_is("success")
    }

    /// Explicit failure: `success: false`, or a `status` other than `"success"`
    /// without `success: true` next to it.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.is_success() && (self.success == Some(false) || self.status.is_some())
    }

    fn status_is(&self, expected: &str) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case(expected))
    }

    /// Server-provided failure text, from `message` or a string `error`.
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        self.message
            .as_deref()
            .or_else(|| self.error.as_ref().and_then(Value::as_str))
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .map(str::to_string)
    }

    /// The user object, whichever key the endpoint used for it.
    #[must_use]
    pub fn user_value(&self) -> Option<&Value> {
        self.user
            .as_ref()
            .or(self.admin.as_ref())
            .filter(|value| value.is_object())
    }

    /// Decodes `data` into `T`.
    ///
    /// # Errors
    /// Returns `ApiError::Unexpected` if `data` is absent or does not match `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let data = self
            .data
            .clone()
            .ok_or_else(|| ApiError::Unexpected("Response is missing data".to_string()))?;
        serde_json::from_value(data)
            .map_err(|err| ApiError::Unexpected(format!("Failed to decode response data: {err}")))
    }

    /// Decodes a single record that some endpoints return under `data` and
    /// others under a named key.
    ///
    /// # Errors
    /// Returns `ApiError::Unexpected` if neither location holds a matching object.
    pub fn record_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, ApiError> {
        let value = self
            .data
            .clone()
            .or_else(|| self.extra.get(key).cloned())
            .ok_or_else(|| ApiError::Unexpected(format!("Response is missing {key}")))?;
        serde_json::from_value(value)
            .map_err(|err| ApiError::Unexpected(format!("Failed to decode {key}: {err}")))
    }
}

fn deserialize_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}
