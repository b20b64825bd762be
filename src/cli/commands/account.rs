use clap::{Arg, ArgAction, Command};

pub const CMD_PROFILE: &str = "profile";
pub const CMD_PASSWORD: &str = "password";
pub const CMD_SHOW: &str = "show";
pub const CMD_UPDATE: &str = "update";
pub const CMD_CHANGE: &str = "change";

pub const ARG_FIELD: &str = "field";
pub const ARG_CURRENT_PASSWORD: &str = "current";
pub const ARG_NEW_PASSWORD: &str = "new";
pub const ARG_CONFIRM_PASSWORD: &str = "confirm";

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_PROFILE)
                .about("View or edit your profile")
                .subcommand_required(true)
                .subcommand(Command::new(CMD_SHOW).about("Fetch the profile"))
                .subcommand(
                    Command::new(CMD_UPDATE).about("Update profile fields").arg(
                        Arg::new(ARG_FIELD)
                            .short('f')
                            .long(ARG_FIELD)
                            .help("Field to set, as key=value (repeatable)")
                            .action(ArgAction::Append)
                            .required(true),
                    ),
                ),
        )
        .subcommand(
            Command::new(CMD_PASSWORD)
                .about("Manage your password")
                .subcommand_required(true)
                .subcommand(
                    Command::new(CMD_CHANGE)
                        .about("Change your password")
                        .arg(
                            Arg::new(ARG_CURRENT_PASSWORD)
                                .long(ARG_CURRENT_PASSWORD)
                                .help("Current password; prompted for when absent"),
                        )
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
                ),
        )
}
