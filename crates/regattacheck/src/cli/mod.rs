//! Command-line interface for regattacheck.
//!
//! This module provides the CLI structure for the `regcheck` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ActionArg, CheckCommand, ConfigCommand, DollyCommand, DollyStatusArg, EventsCommand,
    IngestCommand, OriginArg, ProgressCommand, ResetCommand, StatusCommand,
};

/// regcheck - dockside check-in/check-out tracking
///
/// Keeps an offline roster of competitors, records check-out and check-in
/// events by sail number, and tracks dolly status per bow.
#[derive(Debug, Parser)]
#[command(name = "regcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a roster, replacing the previous one wholesale
    Ingest(IngestCommand),

    /// Record a check-out or check-in for a competitor
    Check(CheckCommand),

    /// Show roster readiness and store counts
    Status(StatusCommand),

    /// List recorded check events, newest first
    Events(EventsCommand),

    /// Show per-class completion counts for one action type
    Progress(ProgressCommand),

    /// Track dolly status per bow
    #[command(subcommand)]
    Dollies(DollyCommand),

    /// Clear roster, events, dollies, and metadata
    Reset(ResetCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "regcheck");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_quiet() {
        let cli = Cli {
            config: None,
            verbose: 0,
            quiet: true,
            command: Command::Status(StatusCommand { json: false }),
        };
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Quiet);
    }

    #[test]
    fn test_verbosity_levels() {
        for (verbose, expected) in [
            (0, crate::logging::Verbosity::Normal),
            (1, crate::logging::Verbosity::Verbose),
            (2, crate::logging::Verbosity::Trace),
        ] {
            let cli = Cli {
                config: None,
                verbose,
                quiet: false,
                command: Command::Status(StatusCommand { json: false }),
            };
            assert_eq!(cli.verbosity(), expected);
        }
    }

    #[test]
    fn test_parse_ingest() {
        let args = vec!["regcheck", "ingest", "roster.json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Command::Ingest(_)));
    }

    #[test]
    fn test_parse_check() {
        let args = vec![
            "regcheck", "check", "check-out", "--sail", "USA 214567", "--class", "ILCA 6",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Check(cmd) => {
                assert_eq!(cmd.action, ActionArg::CheckOut);
                assert_eq!(cmd.sail, "USA 214567");
                assert_eq!(cmd.class.as_deref(), Some("ILCA 6"));
                assert_eq!(cmd.origin, OriginArg::Manual);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_check_with_origin() {
        let args = vec![
            "regcheck", "check", "check-in", "--sail", "1234", "--origin", "live-scan",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Check(cmd) => assert_eq!(cmd.origin, OriginArg::LiveScan),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_progress() {
        let args = vec!["regcheck", "progress", "check-out", "--json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Command::Progress(_)));
    }

    #[test]
    fn test_parse_dollies_set() {
        let args = vec![
            "regcheck", "dollies", "set", "ILCA 6", "12", "broken", "--note", "cracked hull",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Dollies(DollyCommand::Set {
                class,
                bow,
                status,
                note,
            }) => {
                assert_eq!(class, "ILCA 6");
                assert_eq!(bow, 12);
                assert_eq!(status, DollyStatusArg::Broken);
                assert_eq!(note.as_deref(), Some("cracked hull"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_reset_requires_no_args() {
        let args = vec!["regcheck", "reset", "--yes"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Reset(cmd) => assert!(cmd.yes),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_check_class_with_global_config() {
        // --class must coexist with the global -c/--config short.
        let args = vec![
            "regcheck", "-c", "/custom/config.toml", "check", "check-out", "--sail", "1234",
            "--class", "ILCA 6",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        match cli.command {
            Command::Check(cmd) => assert_eq!(cmd.class.as_deref(), Some("ILCA 6")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_dollies_list_class() {
        let args = vec!["regcheck", "dollies", "list", "--class", "ILCA 6"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Dollies(DollyCommand::List { class, json }) => {
                assert_eq!(class.as_deref(), Some("ILCA 6"));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["regcheck", "-c", "/custom/config.toml", "status"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_quiet() {
        let args = vec!["regcheck", "-q", "status"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.quiet);
    }
}
