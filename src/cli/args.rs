//! CLI argument definitions using clap
//!
//! Commands:
//! - docstore session [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docstore - an in-memory document state store
#[derive(Parser, Debug)]
#[command(name = "docstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a store session reading JSON requests from stdin
    Session {
        /// Path to a JSON configuration file; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session() {
        let cli = Cli::parse_from(["docstore", "session", "--config", "store.json"]);
        match cli.command {
            Command::Session { config } => {
                assert_eq!(config, Some(PathBuf::from("store.json")));
            }
        }

        let cli = Cli::parse_from(["docstore", "session"]);
        assert!(matches!(cli.command, Command::Session { config: None }));
    }
}
