//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Register command arguments.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Donor's full name
    #[arg(long)]
    pub name: String,

    /// Age in years
    #[arg(long, allow_hyphen_values = true)]
    pub age: String,

    /// Blood group (A+, A-, B+, B-, AB+, AB-, O+, O-)
    #[arg(short, long = "blood-group", allow_hyphen_values = true)]
    pub blood_group: String,

    /// Phone number or other contact detail
    #[arg(long)]
    pub contact: String,

    /// City of residence
    #[arg(long)]
    pub city: String,

    /// Register without asking when the age is outside the usual range
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for commands that render a view.
#[derive(Debug, Args)]
pub struct ViewCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Id of the donor to delete
    pub id: i64,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Donor target commands.
#[derive(Debug, Subcommand)]
pub enum TargetsCommand {
    /// Show the target for every group
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Change targets, e.g. `bbank targets set O-=12 AB+=4`
    Set {
        /// One or more GROUP=VALUE assignments
        #[arg(required = true, allow_hyphen_values = true)]
        assignments: Vec<String>,
    },

    /// Edit every target in turn
    Edit,

    /// Restore the built-in targets
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Storage inspection commands.
#[derive(Debug, Subcommand)]
pub enum StorageCommand {
    /// Show what the registry database holds
    Stats {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
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

/// Raw access to the stored JSON.
#[derive(Debug, Subcommand)]
pub enum DebugCommand {
    /// Print the stored donor list
    GetDonors,

    /// Replace the stored donor list
    SetDonors {
        /// A JSON array of donor records
        json: String,
    },

    /// Print the stored target table
    GetTargets,

    /// Replace the stored target table
    SetTargets {
        /// A JSON object mapping group labels to targets
        json: String,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
    /// HTML fragment
    Html,
}
