//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::model::{DollyStatus, EventAction, EventOrigin};

/// Ingest command arguments.
#[derive(Debug, Args)]
pub struct IngestCommand {
    /// JSON file holding an array of roster rows
    /// ({class, country, sail, bow, crew, club})
    pub file: PathBuf,
}

/// Check command arguments.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Which action to record
    #[arg(value_enum)]
    pub action: ActionArg,

    /// Raw sail number as read off the hull
    #[arg(short, long)]
    pub sail: String,

    /// Restrict the lookup to one class (default: any class)
    #[arg(long)]
    pub class: Option<String>,

    /// How the sail number was obtained
    #[arg(short, long, value_enum, default_value = "manual")]
    pub origin: OriginArg,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Events command arguments.
#[derive(Debug, Args)]
pub struct EventsCommand {
    /// Filter by action type
    #[arg(short, long, value_enum)]
    pub action: Option<ActionArg>,

    /// Maximum number of events to show
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Progress command arguments.
#[derive(Debug, Args)]
pub struct ProgressCommand {
    /// Action type to summarize
    #[arg(value_enum)]
    pub action: ActionArg,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Dolly tracking commands.
#[derive(Debug, Subcommand)]
pub enum DollyCommand {
    /// Create missing dolly entries from the current roster
    Ensure,

    /// List dolly entries
    List {
        /// Restrict to one class
        #[arg(long)]
        class: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set the status of one dolly
    Set {
        /// Boat class
        class: String,

        /// Bow number
        bow: i64,

        /// New status
        #[arg(value_enum)]
        status: DollyStatusArg,

        /// Optional note (blank clears the note)
        #[arg(short, long)]
        note: Option<String>,
    },
}

/// Reset command arguments.
#[derive(Debug, Args)]
pub struct ResetCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Action type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    /// Departure to the water
    CheckOut,
    /// Return from the water
    CheckIn,
}

impl From<ActionArg> for EventAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::CheckOut => Self::CheckOut,
            ActionArg::CheckIn => Self::CheckIn,
        }
    }
}

/// Event origin argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OriginArg {
    /// Typed in by an operator
    #[default]
    Manual,
    /// Read off a single camera frame
    Camera,
    /// Produced by the continuous scanning loop
    LiveScan,
}

impl From<OriginArg> for EventOrigin {
    fn from(arg: OriginArg) -> Self {
        match arg {
            OriginArg::Manual => Self::Manual,
            OriginArg::Camera => Self::Camera,
            OriginArg::LiveScan => Self::LiveScan,
        }
    }
}

/// Dolly status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DollyStatusArg {
    /// Present and usable
    Ok,
    /// Not where it should be
    Missing,
    /// Present but unusable
    Broken,
}

impl From<DollyStatusArg> for DollyStatus {
    fn from(arg: DollyStatusArg) -> Self {
        match arg {
            DollyStatusArg::Ok => Self::Ok,
            DollyStatusArg::Missing => Self::Missing,
            DollyStatusArg::Broken => Self::Broken,
        }
    }
}
