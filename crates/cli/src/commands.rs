//! Clap command tree definition.
//!
//! Global options name the store; subcommands act on streams in it.

use clap::{Arg, ArgAction, Command};
use streamstate::DEFAULT_DATABASE;

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("streamstate")
        .about("Stream lifecycle store with optimistic concurrency")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("url")
                .long("url")
                .env("STREAMSTATE_URL")
                .value_name("ENDPOINT")
                .help("Store endpoint: mem://, file://<path> or a directory path")
                .required(true)
                .global(true),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .env("STREAMSTATE_DB")
                .value_name("NAME")
                .help("Database namespace")
                .default_value(DEFAULT_DATABASE)
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .conflicts_with("raw")
                .global(true),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Raw output mode (bare values)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(build_race())
        .subcommand(build_create())
        .subcommand(build_get())
        .subcommand(build_set())
        .subcommand(build_admin_set())
}

fn stream_id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_name("ID")
        .help("Stream identifier")
}

fn state_arg() -> Arg {
    Arg::new("state")
        .required(true)
        .value_name("STATE")
        .help("created, active, interrupted or finished")
}

fn build_race() -> Command {
    Command::new("race")
        .about("Race interrupted against finished from active, repeatedly")
        .arg(
            Arg::new("id")
                .long("id")
                .value_name("ID")
                .help("Existing stream to use (default: create one)"),
        )
        .arg(
            Arg::new("trials")
                .long("trials")
                .value_name("N")
                .value_parser(clap::value_parser!(u64))
                .default_value("30")
                .help("Number of trials"),
        )
        .arg(
            Arg::new("settle-ms")
                .long("settle-ms")
                .value_name("MS")
                .value_parser(clap::value_parser!(u64))
                .default_value("100")
                .help("Pause after each reset, in milliseconds"),
        )
        .arg(
            Arg::new("no-rendezvous")
                .long("no-rendezvous")
                .action(ArgAction::SetTrue)
                .help("Let racers read whenever they get scheduled"),
        )
}

fn build_create() -> Command {
    Command::new("create")
        .about("Insert a new stream")
        .arg(
            Arg::new("state")
                .long("state")
                .value_name("STATE")
                .default_value("created")
                .help("Initial state"),
        )
}

fn build_get() -> Command {
    Command::new("get")
        .about("Show a stream")
        .arg(stream_id_arg())
}

fn build_set() -> Command {
    Command::new("set")
        .about("Change a stream's state (validated, race-checked)")
        .arg(stream_id_arg())
        .arg(state_arg())
}

fn build_admin_set() -> Command {
    Command::new("admin-set")
        .about("Overwrite a stream's state without validation")
        .arg(stream_id_arg())
        .arg(state_arg())
}
