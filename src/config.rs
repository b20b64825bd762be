//! Resolved client configuration. Values come from CLI flags or `LEGASI_*`
//! environment variables; nothing here is secret.

use crate::{api::Endpoints, features::auth::GatePolicy};
use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};
use url::Url;

/// Default request timeout applied to every backend call.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
/// Session file location relative to the home directory.
pub const DEFAULT_SESSION_FILE: &str = ".legasi/session.json";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: Url,
    pub timeout: Duration,
    pub session_file: PathBuf,
    pub endpoints: Endpoints,
    pub gate_policy: GatePolicy,
}

impl AppConfig {
    /// Builds a config with default endpoints, timeout and gate policy.
    ///
    /// # Errors
    /// Returns an error if `api_base_url` is not an absolute http(s) URL.
    pub fn new(api_base_url: &str, session_file: PathBuf) -> Result<Self, String> {
        Ok(Self {
            api_base_url: parse_base_url(api_base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            session_file,
            endpoints: Endpoints::default(),
            gate_policy: GatePolicy::default(),
        })
    }
}

/// Validates the API base URL.
///
/// # Errors
/// Returns an error string for empty, unparsable or non-http(s) URLs.
pub fn parse_base_url(value: &str) -> Result<Url, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("API base URL is empty".to_string());
    }

    let url = Url::parse(trimmed).map_err(|err| format!("invalid API base URL {trimmed}: {err}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(format!("unsupported API URL scheme: {scheme}")),
    }
}

/// Session file under `$HOME`, or in the working directory when `HOME` is unset.
#[must_use]
pub fn default_session_file() -> PathBuf {
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map_or_else(
            || PathBuf::from(DEFAULT_SESSION_FILE),
            |home| Path::new(&home).join(DEFAULT_SESSION_FILE),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_base_url_accepts_http_and_https() {
        assert!(parse_base_url("https://dms.legasi.org").is_ok());
        assert!(parse_base_url("  http://localhost:8000/ ").is_ok());
    }

    #[test]
    fn parse_base_url_rejects_other_schemes() {
        assert_eq!(
            parse_base_url("ftp://dms.legasi.org"),
            Err("unsupported API URL scheme: ftp".to_string())
        );
        assert!(parse_base_url("").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn default_session_file_uses_home() {
        temp_env::with_var("HOME", Some("/home/pm"), || {
            assert_eq!(
                default_session_file(),
                PathBuf::from("/home/pm/.legasi/session.json")
            );
        });
        temp_env::with_var("HOME", None::<&str>, || {
            assert_eq!(default_session_file(), PathBuf::from(DEFAULT_SESSION_FILE));
        });
    }

    #[test]
    fn new_uses_defaults() {
        let config = AppConfig::new("https://dms.legasi.org", PathBuf::from("s.json"));
        let Ok(config) = config else {
            panic!("config should build");
        };
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECONDS));
        assert_eq!(config.gate_policy, GatePolicy::default());
    }
}
