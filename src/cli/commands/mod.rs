pub mod account;
pub mod auth;
pub mod client;
pub mod logging;
pub mod records;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("legasi")
        .about("LEGASI DMS dashboard client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true);

    let command = client::with_args(command);
    let command = logging::with_args(command);
    let command = auth::with_subcommands(command);
    let command = account::with_subcommands(command);
    records::with_subcommands(command)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::features::auth::GatePolicy;
    use std::time::Duration;

    fn with_cleared_env<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        temp_env::with_vars(
            [
                ("LEGASI_API_URL", None::<&str>),
                ("LEGASI_LOG_LEVEL", None::<&str>),
                ("LEGASI_LOG_FORMAT", None::<&str>),
                ("LEGASI_TIMEOUT_SECONDS", None::<&str>),
                ("LEGASI_SESSION_FILE", None::<&str>),
                ("LEGASI_ENDPOINTS", None::<&str>),
                ("LEGASI_GATE_SUPER_ADMIN", None::<&str>),
                ("LEGASI_NO_GATE_PROJECT_MANAGER", None::<&str>),
                ("LEGASI_ROLE", None::<&str>),
                ("LEGASI_EMAIL", None::<&str>),
                ("LEGASI_PASSWORD", None::<&str>),
            ],
            f,
        )
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "legasi");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("LEGASI DMS dashboard client".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_login_args() {
        with_cleared_env(|| {
            let matches = new().get_matches_from(vec![
                "legasi",
                "--api-url",
                "https://dms.legasi.org",
                "login",
                "--role",
                "super-admin",
                "--email",
                "root@legasi.org",
            ]);

            let (name, sub) = matches.subcommand().unwrap();
            assert_eq!(name, auth::CMD_LOGIN);
            assert_eq!(
                sub.get_one::<String>(auth::ARG_ROLE).cloned(),
                Some("super-admin".to_string())
            );
            assert_eq!(sub.get_one::<String>(auth::ARG_PASSWORD), None);
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("LEGASI_API_URL", Some("https://dms.legasi.org")),
                ("LEGASI_TIMEOUT_SECONDS", Some("5")),
                ("LEGASI_SESSION_FILE", Some("/tmp/legasi-session.json")),
                ("LEGASI_ENDPOINTS", Some("profile=/v2/me")),
                ("LEGASI_GATE_SUPER_ADMIN", Some("true")),
                ("LEGASI_NO_GATE_PROJECT_MANAGER", None::<&str>),
                ("LEGASI_LOG_LEVEL", Some("info")),
                ("LEGASI_LOG_FORMAT", None::<&str>),
            ],
            || {
                let matches = new().get_matches_from(vec!["legasi", "whoami"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );

                let config = client::config(&matches).unwrap();
                assert_eq!(config.api_base_url.as_str(), "https://dms.legasi.org/");
                assert_eq!(config.timeout, Duration::from_secs(5));
                assert_eq!(
                    config.session_file,
                    std::path::PathBuf::from("/tmp/legasi-session.json")
                );
                assert_eq!(config.endpoints.profile, "/v2/me");
                assert_eq!(
                    config.gate_policy,
                    GatePolicy {
                        super_admin: true,
                        project_manager: true,
                    }
                );
            },
        );
    }

    #[test]
    fn test_missing_api_url() {
        with_cleared_env(|| {
            let matches = new().get_matches_from(vec!["legasi", "projects", "list"]);
            let err = client::config(&matches).unwrap_err();
            assert!(err.to_string().contains("--api-url"));
        });
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("LEGASI_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["legasi", "logout"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("LEGASI_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["legasi".to_string(), "dashboard".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_entries_create_collects_repeated_args() {
        with_cleared_env(|| {
            let matches = new().get_matches_from(vec![
                "legasi",
                "entries",
                "create",
                "--project",
                "4",
                "-d",
                "households=12",
                "-d",
                "community=Makoko",
                "--attach",
                "a.png",
                "--attach",
                "b.pdf",
            ]);
            let (_, entries) = matches.subcommand().unwrap();
            let (name, create) = entries.subcommand().unwrap();
            assert_eq!(name, records::CMD_CREATE);
            assert_eq!(
                create
                    .get_many::<String>(records::ARG_DATA)
                    .map(|values| values.count()),
                Some(2)
            );
            assert_eq!(
                create
                    .get_many::<String>(records::ARG_ATTACH)
                    .map(|values| values.cloned().collect::<Vec<_>>()),
                Some(vec!["a.png".to_string(), "b.pdf".to_string()])
            );
        });
    }

    #[test]
    fn test_subcommand_required() {
        let result = new().try_get_matches_from(vec!["legasi", "projects"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result = new().try_get_matches_from(vec![
            "legasi", "login", "--role", "viewer", "--email", "x@y.z",
        ]);
        assert_eq!(
            result.map_err(|e| e.kind()).err(),
            Some(clap::error::ErrorKind::InvalidValue)
        );
    }
}
