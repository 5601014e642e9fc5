//! CLI module for docstore
//!
//! Provides `docstore session`: one store instance driven by JSON
//! requests on stdin, one JSON response per request on stdout. Logs go
//! to stderr.

mod args;
mod commands;
mod errors;
mod io;
mod request;

pub use args::{Cli, Command};
pub use commands::{load_config, run, run_command, session, Session};
pub use errors::{CliError, CliResult};
pub use io::{read_requests, write_error, write_response};
pub use request::Request;
