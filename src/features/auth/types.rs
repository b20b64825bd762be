//! Request and response types for login and onboarding. Credentials and
//! passwords are held as secrets and must never be logged.

use crate::api::RecordId;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Super Admin")]
    SuperAdmin,
    #[serde(rename = "Project Manager")]
    ProjectManager,
}

impl Role {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::ProjectManager => "Project Manager",
        }
    }

    /// Dashboard route the wizard redirects to once onboarding completes.
    #[must_use]
    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Self::SuperAdmin => "/super-admin",
            Self::ProjectManager => "/project-manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match normalized.as_str() {
            "superadmin" | "admin" => Ok(Self::SuperAdmin),
            "projectmanager" | "pm" | "manager" => Ok(Self::ProjectManager),
            _ => Err(format!("unknown role: {value}")),
        }
    }
}

/// User as returned by the backend and kept in the session. Role-specific
/// fields the client does not know about are carried in `extra` untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub email_verified: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub temporal_password: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.fullname.as_deref())
            .or(self.email.as_deref())
            .unwrap_or("unknown user")
    }

    /// Role parsed from the stored `role` field, if recognizable.
    #[must_use]
    pub fn parsed_role(&self) -> Option<Role> {
        self.role.as_deref().and_then(|role| role.parse().ok())
    }

    /// Overlays the fields of a server user object onto this record.
    ///
    /// # Errors
    /// Returns an error if the merged object no longer decodes as a user.
    pub fn merge(&mut self, update: &Value) -> Result<(), serde_json::Error> {
        let Value::Object(update) = update else {
            return Ok(());
        };

        let mut merged = match serde_json::to_value(&*self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in update {
            merged.insert(key.clone(), value.clone());
        }

        *self = serde_json::from_value(Value::Object(merged))?;
        Ok(())
    }

    pub fn apply_flags(&mut self, flags: &UserFlags) {
        if let Some(verified) = flags.email_verified {
            self.email_verified = verified;
        }
        if let Some(temporal) = flags.temporal_password {
            self.temporal_password = temporal;
        }
    }
}

/// Onboarding flags reported after a verification step. Absent flags leave
/// the stored value alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct UserFlags {
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub email_verified: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub temporal_password: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password,
        }
    }
}

/// Successful login, before the gate decides what happens next.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub role: Role,
    pub token: SecretString,
    pub user: UserRecord,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub flags: UserFlags,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PasswordResetOutcome {
    pub token: Option<SecretString>,
    pub user: Option<Value>,
    pub message: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct AdminLoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct ProjectManagerLoginRequest<'a> {
    pub login_id: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerifyEmailRequest<'a> {
    pub verification_code: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TemporaryPasswordRequest<'a> {
    pub new_password: &'a str,
    pub confirm_password: &'a str,
}

/// Backends send flags as booleans, 0/1 or strings.
fn flag_from_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_i64().map(|n| n != 0),
        Value::String(text) => match text.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(deserialize_optional_flag(deserializer)?.unwrap_or(false))
}

fn deserialize_optional_flag<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<bool>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    flag_from_value(&value)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid flag value: {value}")))
}
