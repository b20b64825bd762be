use clap::{Arg, ArgAction, Command};

pub const CMD_PROJECTS: &str = "projects";
pub const CMD_ENTRIES: &str = "entries";
pub const CMD_DASHBOARD: &str = "dashboard";
pub const CMD_LIST: &str = "list";
pub const CMD_SHOW: &str = "show";
pub const CMD_CREATE: &str = "create";
pub const CMD_UPDATE: &str = "update";
pub const CMD_DELETE: &str = "delete";

pub const ARG_ID: &str = "id";
pub const ARG_PROJECT: &str = "project";
pub const ARG_DATA: &str = "data";
pub const ARG_ATTACH: &str = "attach";

fn id_arg() -> Arg {
    Arg::new(ARG_ID).help("Record id").required(true)
}

fn entry_body_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DATA)
                .short('d')
                .long(ARG_DATA)
                .help("Entry field, as key=value (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new(ARG_ATTACH)
                .short('a')
                .long(ARG_ATTACH)
                .help("Media file to upload and attach (repeatable)")
                .action(ArgAction::Append),
        )
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_PROJECTS)
                .about("Browse projects")
                .subcommand_required(true)
                .subcommand(Command::new(CMD_LIST).about("List projects"))
                .subcommand(Command::new(CMD_SHOW).about("Show one project").arg(id_arg())),
        )
        .subcommand(
            Command::new(CMD_ENTRIES)
                .about("Manage data entries")
                .subcommand_required(true)
                .subcommand(
                    Command::new(CMD_LIST).about("List entries").arg(
                        Arg::new(ARG_PROJECT)
                            .long(ARG_PROJECT)
                            .help("Only entries of this project"),
                    ),
                )
                .subcommand(Command::new(CMD_SHOW).about("Show one entry").arg(id_arg()))
                .subcommand(entry_body_args(
                    Command::new(CMD_CREATE).about("Create an entry").arg(
                        Arg::new(ARG_PROJECT)
                            .long(ARG_PROJECT)
                            .help("Project the entry belongs to")
                            .required(true),
                    ),
                ))
                .subcommand(entry_body_args(
                    Command::new(CMD_UPDATE)
                        .about("Update an entry")
                        .arg(id_arg())
                        .arg(
                            Arg::new(ARG_PROJECT)
                                .long(ARG_PROJECT)
                                .help("Move the entry to this project"),
                        ),
                ))
                .subcommand(Command::new(CMD_DELETE).about("Delete an entry").arg(id_arg())),
        )
        .subcommand(Command::new(CMD_DASHBOARD).about("Projects and entry statistics at a glance"))
}
