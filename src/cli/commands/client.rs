use crate::{
    api::Endpoints,
    config::{default_session_file, parse_base_url, AppConfig, DEFAULT_TIMEOUT_SECONDS},
    features::auth::GatePolicy,
};
use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgAction, Command};
use std::{path::PathBuf, time::Duration};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_TIMEOUT_SECONDS: &str = "timeout-seconds";
pub const ARG_SESSION_FILE: &str = "session-file";
pub const ARG_ENDPOINTS: &str = "endpoints";
pub const ARG_GATE_SUPER_ADMIN: &str = "gate-super-admin";
pub const ARG_NO_GATE_PROJECT_MANAGER: &str = "no-gate-project-manager";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Backend base URL, example: https://dms.legasi.org")
                .env("LEGASI_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT_SECONDS)
                .long(ARG_TIMEOUT_SECONDS)
                .help("Request timeout in seconds")
                .env("LEGASI_TIMEOUT_SECONDS")
                .global(true)
                .default_value("30")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_SESSION_FILE)
                .long(ARG_SESSION_FILE)
                .help("Where the session token and user are stored (default: ~/.legasi/session.json)")
                .env("LEGASI_SESSION_FILE")
                .global(true),
        )
        .arg(
            Arg::new(ARG_ENDPOINTS)
                .long(ARG_ENDPOINTS)
                .help("Endpoint path overrides, example: profile=/v2/me,projects=/v2/projects")
                .env("LEGASI_ENDPOINTS")
                .global(true),
        )
        .arg(
            Arg::new(ARG_GATE_SUPER_ADMIN)
                .long(ARG_GATE_SUPER_ADMIN)
                .help("Require email verification and password reset for Super Admins too")
                .env("LEGASI_GATE_SUPER_ADMIN")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_NO_GATE_PROJECT_MANAGER)
                .long(ARG_NO_GATE_PROJECT_MANAGER)
                .help("Let Project Managers skip the onboarding gate")
                .env("LEGASI_NO_GATE_PROJECT_MANAGER")
                .global(true)
                .action(ArgAction::SetTrue),
        )
}

/// Builds the client configuration from global arguments.
///
/// # Errors
/// Returns an error if `--api-url` is missing or invalid, or an endpoint
/// override is malformed.
pub fn config(matches: &clap::ArgMatches) -> Result<AppConfig> {
    let api_url = matches
        .get_one::<String>(ARG_API_URL)
        .context("missing required argument: --api-url")?;
    let api_base_url = parse_base_url(api_url).map_err(|e| anyhow!(e))?;

    let timeout = Duration::from_secs(
        matches
            .get_one::<u64>(ARG_TIMEOUT_SECONDS)
            .copied()
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
    );

    let mut endpoints = Endpoints::default();
    if let Some(overrides) = matches.get_one::<String>(ARG_ENDPOINTS) {
        endpoints.apply_overrides(overrides).map_err(|e| anyhow!(e))?;
    }

    Ok(AppConfig {
        api_base_url,
        timeout,
        session_file: session_file(matches),
        endpoints,
        gate_policy: gate_policy(matches),
    })
}

/// Session file from `--session-file`, or the default under `$HOME`.
#[must_use]
pub fn session_file(matches: &clap::ArgMatches) -> PathBuf {
    matches
        .get_one::<String>(ARG_SESSION_FILE)
        .map_or_else(default_session_file, PathBuf::from)
}

#[must_use]
pub fn gate_policy(matches: &clap::ArgMatches) -> GatePolicy {
    GatePolicy {
        super_admin: matches.get_flag(ARG_GATE_SUPER_ADMIN),
        project_manager: !matches.get_flag(ARG_NO_GATE_PROJECT_MANAGER),
    }
}
