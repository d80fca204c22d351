//! Command-line interface for bloodbank.
//!
//! This module provides the CLI structure and command handlers for the
//! `bbank` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DebugCommand, DeleteCommand, OutputFormat, RegisterCommand, StorageCommand,
    TargetsCommand, ViewCommand,
};

/// bbank - A local blood donor registry
///
/// Register donors, see how each blood group is doing against its target,
/// and find out which group is most needed.
#[derive(Debug, Parser)]
#[command(name = "bbank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug)
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
    /// Register a new donor
    Register(RegisterCommand),

    /// Show total donors and the most needed group
    Home(ViewCommand),

    /// Show each group's progress towards its target
    Availability(ViewCommand),

    /// List registered donors, newest first
    Donors(ViewCommand),

    /// Delete a donor by id
    Delete(DeleteCommand),

    /// View or change donor targets
    #[command(subcommand)]
    Targets(TargetsCommand),

    /// Inspect the registry database
    #[command(subcommand)]
    Storage(StorageCommand),

    /// View or modify configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Read or replace the stored JSON directly
    #[command(subcommand)]
    Debug(DebugCommand),
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

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Home(ViewCommand {
                format: OutputFormat::Plain,
            }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "bbank");
    }

    #[test]
    fn test_verbosity_quiet() {
        assert_eq!(cli_with(0, true).verbosity(), crate::logging::Verbosity::Quiet);
    }

    #[test]
    fn test_verbosity_normal() {
        assert_eq!(cli_with(0, false).verbosity(), crate::logging::Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_verbose() {
        assert_eq!(cli_with(1, false).verbosity(), crate::logging::Verbosity::Verbose);
    }

    #[test]
    fn test_verbosity_trace() {
        assert_eq!(cli_with(2, false).verbosity(), crate::logging::Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_register() {
        let args = vec![
            "bbank", "register", "--name", "Jo", "--age", "30", "--blood-group", "AB-",
            "--contact", "555", "--city", "X",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Register(cmd) => {
                assert_eq!(cmd.name, "Jo");
                assert_eq!(cmd.age, "30");
                assert_eq!(cmd.blood_group, "AB-");
                assert!(!cmd.yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_register_keeps_age_text() {
        let args = vec![
            "bbank", "register", "--name", "Jo", "--age", "-5", "-b", "O+", "--contact", "555",
            "--city", "X",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Command::Register(cmd) if cmd.age == "-5"));
    }

    #[test]
    fn test_parse_availability_json() {
        let args = vec!["bbank", "availability", "--format", "json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Availability(ViewCommand {
                format: OutputFormat::Json
            })
        ));
    }

    #[test]
    fn test_parse_delete() {
        let args = vec!["bbank", "delete", "1717228800000", "-y"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Delete(DeleteCommand {
                id: 1_717_228_800_000,
                yes: true
            })
        ));
    }

    #[test]
    fn test_parse_targets_set() {
        let args = vec!["bbank", "targets", "set", "O-=12", "AB+=4"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Targets(TargetsCommand::Set { assignments }) => {
                assert_eq!(assignments, ["O-=12", "AB+=4"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_targets_set_requires_assignment() {
        let args = vec!["bbank", "targets", "set"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_debug_set_targets() {
        let args = vec!["bbank", "debug", "set-targets", r#"{"O+":5}"#];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Debug(DebugCommand::SetTargets { .. })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["bbank", "-c", "/custom/config.toml", "home"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let args = vec!["bbank", "-v", "donors"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_parse_with_quiet() {
        let args = vec!["bbank", "-q", "storage", "stats"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.quiet);
    }
}
