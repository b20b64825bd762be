use clap::{Arg, Command};

pub const CMD_LOGIN: &str = "login";
pub const CMD_VERIFY: &str = "verify";
pub const CMD_RESEND_CODE: &str = "resend-code";
pub const CMD_RESET_PASSWORD: &str = "reset-password";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_WHOAMI: &str = "whoami";

pub const ARG_ROLE: &str = "role";
pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_CODE: &str = "code";
pub const ARG_NEW_PASSWORD: &str = "new";
pub const ARG_CONFIRM_PASSWORD: &str = "confirm";

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Sign in and complete onboarding interactively")
                .arg(
                    Arg::new(ARG_ROLE)
                        .long(ARG_ROLE)
                        .help("Account role")
                        .env("LEGASI_ROLE")
                        .default_value("project-manager")
                        .value_parser(["super-admin", "project-manager"]),
                )
                .arg(
                    Arg::new(ARG_EMAIL)
                        .short('e')
                        .long(ARG_EMAIL)
                        .help("Email address (Project Managers: login id)")
                        .env("LEGASI_EMAIL")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_PASSWORD)
                        .short('p')
                        .long(ARG_PASSWORD)
                        .help("Password; prompted for when absent")
                        .env("LEGASI_PASSWORD")
                        .hide_env_values(true),
                ),
        )
        .subcommand(
            Command::new(CMD_VERIFY)
                .about("Submit the 6-digit email verification code")
                .arg(
                    Arg::new(ARG_CODE)
                        .short('c')
                        .long(ARG_CODE)
                        .help("Verification code")
                        .required(true),
                ),
        )
        .subcommand(Command::new(CMD_RESEND_CODE).about("Send a new verification code"))
        .subcommand(
            Command::new(CMD_RESET_PASSWORD)
                .about("Replace the temporary password")
                .arg(
                    Arg::new(ARG_NEW_PASSWORD)
                        .long(ARG_NEW_PASSWORD)
                        .help("New password; prompted for when absent"),
                )
                .arg(
                    Arg::new(ARG_CONFIRM_PASSWORD)
                        .long(ARG_CONFIRM_PASSWORD)
                        .help("New password again; prompted for when absent"),
                ),
        )
        .subcommand(Command::new(CMD_LOGOUT).about("Remove the stored session"))
        .subcommand(Command::new(CMD_WHOAMI).about("Show the signed-in user and onboarding state"))
}
