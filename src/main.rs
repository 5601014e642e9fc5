//! docstore CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. Errors are printed
//! to stderr with a non-zero exit.

use docstore::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}: {}", e.code(), e);
        std::process::exit(1);
    }
}
