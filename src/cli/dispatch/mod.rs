//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to an `Action` carrying the resolved client
//! configuration and the command's own arguments.

use crate::{
    api::RecordId,
    cli::{
        actions::{account, auth, dashboard, entries, projects, session, Action},
        commands::{account as account_cmd, auth as auth_cmd, client, records},
    },
    features::auth::Role,
};
use anyhow::{anyhow, bail, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or malformed.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let (name, sub) = matches
        .subcommand()
        .context("missing command, see --help")?;

    match name {
        auth_cmd::CMD_LOGOUT | auth_cmd::CMD_WHOAMI => Ok(Action::Session(session::Args {
            session_file: client::session_file(matches),
            gate_policy: client::gate_policy(matches),
            command: if name == auth_cmd::CMD_LOGOUT {
                session::Command::Logout
            } else {
                session::Command::Whoami
            },
        })),
        auth_cmd::CMD_LOGIN
        | auth_cmd::CMD_VERIFY
        | auth_cmd::CMD_RESEND_CODE
        | auth_cmd::CMD_RESET_PASSWORD => Ok(Action::Auth(auth::Args {
            config: client::config(matches)?,
            command: auth_command(name, sub)?,
        })),
        account_cmd::CMD_PROFILE | account_cmd::CMD_PASSWORD => {
            Ok(Action::Account(account::Args {
                config: client::config(matches)?,
                command: account_command(name, sub)?,
            }))
        }
        records::CMD_PROJECTS => Ok(Action::Projects(projects::Args {
            config: client::config(matches)?,
            command: projects_command(sub)?,
        })),
        records::CMD_ENTRIES => Ok(Action::Entries(entries::Args {
            config: client::config(matches)?,
            command: entries_command(sub)?,
        })),
        records::CMD_DASHBOARD => Ok(Action::Dashboard(dashboard::Args {
            config: client::config(matches)?,
        })),
        other => bail!("unknown command: {other}"),
    }
}

fn auth_command(name: &str, matches: &ArgMatches) -> Result<auth::Command> {
    let command = match name {
        auth_cmd::CMD_LOGIN => {
            let role = matches
                .get_one::<String>(auth_cmd::ARG_ROLE)
                .context("missing required argument: --role")?
                .parse::<Role>()
                .map_err(|e| anyhow!(e))?;
            auth::Command::Login {
                role,
                email: required(matches, auth_cmd::ARG_EMAIL)?,
                password: secret(matches, auth_cmd::ARG_PASSWORD),
            }
        }
        auth_cmd::CMD_VERIFY => auth::Command::Verify {
            code: required(matches, auth_cmd::ARG_CODE)?,
        },
        auth_cmd::CMD_RESEND_CODE => auth::Command::ResendCode,
        _ => auth::Command::ResetPassword {
            new_password: secret(matches, auth_cmd::ARG_NEW_PASSWORD),
            confirm_password: secret(matches, auth_cmd::ARG_CONFIRM_PASSWORD),
        },
    };
    Ok(command)
}

fn account_command(name: &str, matches: &ArgMatches) -> Result<account::Command> {
    let (sub_name, sub) = matches
        .subcommand()
        .with_context(|| format!("missing {name} command, see --help"))?;

    let command = match (name, sub_name) {
        (account_cmd::CMD_PROFILE, account_cmd::CMD_SHOW) => account::Command::ProfileShow,
        (account_cmd::CMD_PROFILE, account_cmd::CMD_UPDATE) => account::Command::ProfileUpdate {
            fields: parse_fields(sub, account_cmd::ARG_FIELD)?,
        },
        (account_cmd::CMD_PASSWORD, account_cmd::CMD_CHANGE) => account::Command::PasswordChange {
            current_password: secret(sub, account_cmd::ARG_CURRENT_PASSWORD),
            new_password: secret(sub, account_cmd::ARG_NEW_PASSWORD),
            confirm_password: secret(sub, account_cmd::ARG_CONFIRM_PASSWORD),
        },
        (name, sub_name) => bail!("unknown command: {name} {sub_name}"),
    };
    Ok(command)
}

fn projects_command(matches: &ArgMatches) -> Result<projects::Command> {
    let (name, sub) = matches
        .subcommand()
        .context("missing projects command, see --help")?;

    match name {
        records::CMD_LIST => Ok(projects::Command::List),
        records::CMD_SHOW => Ok(projects::Command::Show {
            id: record_id(sub, records::ARG_ID)?,
        }),
        other => bail!("unknown command: projects {other}"),
    }
}

fn entries_command(matches: &ArgMatches) -> Result<entries::Command> {
    let (name, sub) = matches
        .subcommand()
        .context("missing entries command, see --help")?;

    let command = match name {
        records::CMD_LIST => entries::Command::List {
            project: optional_record_id(sub, records::ARG_PROJECT),
        },
        records::CMD_SHOW => entries::Command::Show {
            id: record_id(sub, records::ARG_ID)?,
        },
        records::CMD_CREATE => entries::Command::Create {
            project: record_id(sub, records::ARG_PROJECT)?,
            fields: parse_fields(sub, records::ARG_DATA)?,
            attachments: paths(sub, records::ARG_ATTACH),
        },
        records::CMD_UPDATE => entries::Command::Update {
            id: record_id(sub, records::ARG_ID)?,
            project: optional_record_id(sub, records::ARG_PROJECT),
            fields: parse_fields(sub, records::ARG_DATA)?,
            attachments: paths(sub, records::ARG_ATTACH),
        },
        records::CMD_DELETE => entries::Command::Delete {
            id: record_id(sub, records::ARG_ID)?,
        },
        other => bail!("unknown command: entries {other}"),
    };
    Ok(command)
}

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: --{id}"))
}

fn secret(matches: &ArgMatches, id: &str) -> Option<SecretString> {
    matches
        .get_one::<String>(id)
        .map(|value| SecretString::from(value.clone()))
}

fn record_id(matches: &ArgMatches, id: &str) -> Result<RecordId> {
    required(matches, id).map(|value| RecordId::from(value.trim()))
}

fn optional_record_id(matches: &ArgMatches, id: &str) -> Option<RecordId> {
    matches
        .get_one::<String>(id)
        .map(|value| RecordId::from(value.trim()))
}

fn paths(matches: &ArgMatches, id: &str) -> Vec<PathBuf> {
    matches
        .get_many::<String>(id)
        .map(|values| values.map(PathBuf::from).collect())
        .unwrap_or_default()
}

/// Parses repeated `key=value` arguments. Values that are valid JSON
/// (numbers, booleans, arrays, objects, quoted strings) keep their type;
/// anything else is a string.
fn parse_fields(matches: &ArgMatches, id: &str) -> Result<Map<String, Value>> {
    let mut fields = Map::new();
    for pair in matches.get_many::<String>(id).into_iter().flatten() {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("expected key=value, got: {pair}"))?;
        let key = key.trim();
        if key.is_empty() {
            bail!("empty field name in: {pair}");
        }
        let value = serde_json::from_str::<Value>(value)
            .unwrap_or_else(|_| Value::String(value.to_string()));
        fields.insert(key.to_string(), value);
    }
    Ok(fields)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use serde_json::json;

    fn matches(args: &[&str]) -> ArgMatches {
        temp_env::with_vars(
            [
                ("LEGASI_API_URL", Some("https://dms.legasi.org")),
                ("LEGASI_SESSION_FILE", Some("/tmp/legasi-test-session.json")),
                ("LEGASI_ENDPOINTS", None::<&str>),
                ("LEGASI_PASSWORD", None::<&str>),
                ("LEGASI_EMAIL", None::<&str>),
                ("LEGASI_ROLE", None::<&str>),
            ],
            || {
                let mut argv = vec!["legasi"];
                argv.extend_from_slice(args);
                commands::new().get_matches_from(argv)
            },
        )
    }

    #[test]
    fn login_maps_role_and_email() {
        let action = handler(&matches(&["login", "--email", "pm@example.com"])).unwrap();
        match action {
            Action::Auth(auth::Args {
                command:
                    auth::Command::Login {
                        role,
                        email,
                        password,
                    },
                ..
            }) => {
                assert_eq!(role, Role::ProjectManager);
                assert_eq!(email, "pm@example.com");
                assert!(password.is_none());
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn logout_needs_no_api_url() {
        let matches = temp_env::with_vars(
            [
                ("LEGASI_API_URL", None::<&str>),
                ("LEGASI_SESSION_FILE", Some("/tmp/legasi-test-session.json")),
            ],
            || commands::new().get_matches_from(vec!["legasi", "logout"]),
        );
        let action = handler(&matches).unwrap();
        assert!(matches!(
            action,
            Action::Session(session::Args {
                command: session::Command::Logout,
                ..
            })
        ));
    }

    #[test]
    fn entries_create_parses_fields_and_attachments() {
        let action = handler(&matches(&[
            "entries",
            "create",
            "--project",
            "12",
            "-d",
            "households=14",
            "-d",
            "community=Makoko",
            "-d",
            "verified=true",
            "-a",
            "photo.jpg",
        ]))
        .unwrap();

        match action {
            Action::Entries(entries::Args {
                command:
                    entries::Command::Create {
                        project,
                        fields,
                        attachments,
                    },
                ..
            }) => {
                assert_eq!(project, RecordId::Number(12));
                assert_eq!(fields.get("households"), Some(&json!(14)));
                assert_eq!(fields.get("community"), Some(&json!("Makoko")));
                assert_eq!(fields.get("verified"), Some(&json!(true)));
                assert_eq!(attachments, vec![PathBuf::from("photo.jpg")]);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn malformed_field_is_rejected() {
        let result = handler(&matches(&["profile", "update", "--field", "no-equals"]));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("expected key=value"));
    }

    #[test]
    fn projects_show_accepts_text_ids() {
        let action = handler(&matches(&["projects", "show", "64f0c2"])).unwrap();
        assert!(matches!(
            action,
            Action::Projects(projects::Args {
                command: projects::Command::Show { id: RecordId::Text(_) },
                ..
            })
        ));
    }
}
