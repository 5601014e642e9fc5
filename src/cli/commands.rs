//! CLI command implementations

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde_json::{json, Value};

use crate::blob::RecordingBinaryManager;
use crate::observability::{Event, Logger};
use crate::state::{state_to_json, Scalar};
use crate::store::{StateStore, StoreConfig};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_requests, write_error, write_response};
use super::request::Request;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Session { config } => session(config.as_deref()),
    }
}

/// Load configuration, or defaults when no path is given
pub fn load_config(path: Option<&Path>) -> CliResult<StoreConfig> {
    let config = match path {
        Some(path) => StoreConfig::load(path),
        None => Ok(StoreConfig::default()),
    }
    .map_err(|e| CliError::Config(e.to_string()))?;

    let severity = config
        .severity()
        .map_err(|e| CliError::Config(e.to_string()))?;
    Logger::new(severity).log_event_with_fields(
        Event::ConfigLoaded,
        &[("repository", &config.repository_name)],
    );
    Ok(config)
}

/// Run a session over stdin and stdout
pub fn session(config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let session = Session::new(&config)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    session.serve(stdin.lock(), &mut stdout.lock())
}

/// A store plus the request loop driving it
#[derive(Debug)]
pub struct Session {
    store: StateStore,
}

impl Session {
    pub fn new(config: &StoreConfig) -> CliResult<Self> {
        Ok(Self {
            store: StateStore::new(config)?,
        })
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Answer requests until input ends or a shutdown request
    ///
    /// Bad requests get an error response; only I/O failures end the
    /// loop early.
    pub fn serve<R: BufRead, W: Write>(&self, input: R, out: &mut W) -> CliResult<()> {
        for raw in read_requests(input) {
            let request = match raw.and_then(Request::parse) {
                Ok(request) => request,
                Err(e) if e.is_fatal() => {
                    write_error(out, e.code(), &e.to_string())?;
                    return Err(e);
                }
                Err(e) => {
                    write_error(out, e.code(), &e.to_string())?;
                    continue;
                }
            };

            let shutdown = request == Request::Shutdown;
            match self.handle(request) {
                Ok(data) => write_response(out, data)?,
                Err(e) => write_error(out, e.code(), &e.to_string())?,
            }
            if shutdown {
                break;
            }
        }
        Ok(())
    }

    /// Execute one request against the store
    pub fn handle(&self, request: Request) -> CliResult<Value> {
        let store = &self.store;
        let data = match request {
            Request::CreateDocument { document } => {
                json!({ "id": store.create_document(document)? })
            }
            Request::CreateStates { states } => json!({ "created": store.create_states(states)? }),
            Request::GetLock { id } => json!({ "lock": store.get_lock(&id)? }),
            Request::SetLock { id, lock } => {
                let existing = store.set_lock(&id, &lock)?;
                json!({ "acquired": existing.is_none(), "lock": existing })
            }
            Request::RemoveLock { id, owner } => {
                let lock = store.remove_lock(&id, owner.as_deref())?;
                json!({
                    "removed": lock.as_ref().map_or(false, |l| !l.failed),
                    "lock": lock,
                })
            }
            Request::ReadState { id } => {
                json!({ "state": store.read_state(&id)?.as_ref().map(state_to_json) })
            }
            Request::ReadPartialState { id, keys } => {
                let state = store.read_partial_state(&id, &keys)?;
                json!({ "state": state.as_ref().map(state_to_json) })
            }
            Request::ReadChildState {
                parent_id,
                name,
                ignored,
            } => {
                let state = store.read_child_state(&parent_id, &name, &ignored)?;
                json!({ "state": state.as_ref().map(state_to_json) })
            }
            Request::HasChild {
                parent_id,
                name,
                ignored,
            } => json!({ "present": store.has_child(&parent_id, &name, &ignored)? }),
            Request::QueryKeyValue {
                conditions,
                ignored,
            } => {
                let conditions: Vec<(&str, &Scalar)> = conditions
                    .iter()
                    .map(|(key, value)| (key.as_str(), value))
                    .collect();
                let states = store.query_key_values(&conditions, &ignored)?;
                json!({ "states": states.iter().map(state_to_json).collect::<Vec<_>>() })
            }
            Request::QueryKeyValuePresence {
                key,
                value,
                ignored,
            } => json!({ "present": store.query_key_value_presence(&key, &value, &ignored)? }),
            Request::UpdateState { id, diff } => {
                store.update_state(&id, &diff)?;
                json!({ "updated": id })
            }
            Request::DeleteStates { ids } => json!({ "deleted": store.delete_states(&ids)? }),
            Request::MarkReferencedBinaries => {
                let binaries = RecordingBinaryManager::new();
                let marked = store.mark_referenced_binaries(&binaries)?;
                json!({ "marked": marked, "keys": binaries.keys() })
            }
            Request::Metrics => json!(store.metrics().snapshot()),
            Request::Shutdown => {
                store.shutdown()?;
                json!({ "shutdown": true })
            }
        };
        Ok(data)
    }
}
