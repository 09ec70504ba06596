//! ArgMatches → CliAction conversion.
//!
//! Identifiers and states are parsed here so that a typo fails before the
//! store is opened.

use std::time::Duration;

use clap::ArgMatches;
use streamstate::{RaceConfig, StreamId, StreamState};

/// What the invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Run the race harness, creating a stream when `id` is absent.
    Race {
        id: Option<StreamId>,
        config: RaceConfig,
    },
    /// Insert a stream.
    Create { state: StreamState },
    /// Read a stream.
    Get { id: StreamId },
    /// Validated transition.
    Set { id: StreamId, state: StreamState },
    /// Unvalidated overwrite.
    AdminSet { id: StreamId, state: StreamState },
}

/// Convert top-level matches into an action.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    match matches.subcommand() {
        Some(("race", sub)) => {
            let id = sub
                .get_one::<String>("id")
                .map(|raw| parse_id(raw.as_str()))
                .transpose()?;
            let config = RaceConfig {
                trials: sub.get_one::<u64>("trials").copied().unwrap_or(30),
                settle: Duration::from_millis(
                    sub.get_one::<u64>("settle-ms").copied().unwrap_or(100),
                ),
                rendezvous: !sub.get_flag("no-rendezvous"),
            };
            Ok(CliAction::Race { id, config })
        }
        Some(("create", sub)) => Ok(CliAction::Create {
            state: parse_state(optional_str(sub, "state").unwrap_or("created"))?,
        }),
        Some(("get", sub)) => Ok(CliAction::Get {
            id: parse_id(required_str(sub, "id")?)?,
        }),
        Some(("set", sub)) => Ok(CliAction::Set {
            id: parse_id(required_str(sub, "id")?)?,
            state: parse_state(required_str(sub, "state")?)?,
        }),
        Some(("admin-set", sub)) => Ok(CliAction::AdminSet {
            id: parse_id(required_str(sub, "id")?)?,
            state: parse_state(required_str(sub, "state")?)?,
        }),
        Some((other, _)) => Err(format!("Unknown command: {}", other)),
        None => Err("No command given".to_string()),
    }
}

fn optional_str<'a>(m: &'a ArgMatches, name: &str) -> Option<&'a str> {
    m.get_one::<String>(name).map(|s| s.as_str())
}

fn required_str<'a>(m: &'a ArgMatches, name: &str) -> Result<&'a str, String> {
    optional_str(m, name).ok_or_else(|| format!("Missing required argument: {}", name))
}

fn parse_id(raw: &str) -> Result<StreamId, String> {
    raw.parse::<StreamId>().map_err(|e| e.to_string())
}

fn parse_state(raw: &str) -> Result<StreamState, String> {
    raw.parse::<StreamState>().map_err(|e| e.to_string())
}
