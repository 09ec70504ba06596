//! streamstate: command line host for the stream lifecycle store.
//!
//! `streamstate --url <endpoint> [--db <name>] COMMAND`
//!
//! Program results go to stdout, logs to stderr. Exit codes: 0 on success,
//! 1 on a failed operation or store startup, 2 on bad arguments.

mod commands;
mod format;
mod parse;

use std::process;

use anyhow::Context;
use clap::ArgMatches;
use streamstate::{connect, run_race, Endpoint, StateStore, StreamState};
use tracing_subscriber::{fmt, EnvFilter};

use commands::build_cli;
use format::{format_error, format_ok, format_race_report, format_stream, OutputMode};
use parse::{matches_to_action, CliAction};

fn main() {
    let matches = build_cli().get_matches();

    init_logging(matches.get_count("verbose"));

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else if matches.get_flag("raw") {
        OutputMode::Raw
    } else {
        OutputMode::Human
    };

    let action = match matches_to_action(&matches) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    let store = match open_store(&matches) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("could not connect to store: {:#}", e);
            process::exit(1);
        }
    };

    process::exit(execute(&store, action, output_mode));
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(matches: &ArgMatches) -> anyhow::Result<StateStore> {
    let url = matches
        .get_one::<String>("url")
        .context("no endpoint given (--url or STREAMSTATE_URL)")?;
    let database = matches
        .get_one::<String>("db")
        .map(|s| s.as_str())
        .unwrap_or(streamstate::DEFAULT_DATABASE);

    let endpoint = Endpoint::parse(url).with_context(|| format!("bad endpoint '{}'", url))?;
    connect(&endpoint, database)
        .with_context(|| format!("opening database '{}' at {}", database, endpoint))
}

/// Run one action, print its result, return the exit code.
fn execute(store: &StateStore, action: CliAction, mode: OutputMode) -> i32 {
    let result = match action {
        CliAction::Race { id, config } => {
            let id = match id {
                Some(id) => Ok(id),
                None => store
                    .collection()
                    .insert(StreamState::Created)
                    .map(|stream| stream.id),
            };
            id.and_then(|id| run_race(store.collection().clone(), id, &config))
                .map(|report| format_race_report(&report, mode))
        }
        CliAction::Create { state } => store
            .collection()
            .insert(state)
            .map(|stream| format_stream(&stream, mode)),
        CliAction::Get { id } => store
            .get_stream(&id)
            .map(|stream| format_stream(&stream, mode)),
        CliAction::Set { id, state } => store
            .set_state(&id, state)
            .map(|stream| format_stream(&stream, mode)),
        CliAction::AdminSet { id, state } => store
            .set_state_admin(&id, state)
            .map(|()| format_ok(mode)),
    };

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            0
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            1
        }
    }
}
