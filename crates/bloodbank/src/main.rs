//! `bbank` - CLI for bloodbank
//!
//! This binary provides the command-line interface for registering donors,
//! viewing availability against targets and managing the registry database.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::debug;

use bloodbank::cli::{
    Cli, Command, ConfigCommand, DebugCommand, DeleteCommand, OutputFormat, RegisterCommand,
    StorageCommand, TargetsCommand,
};
use bloodbank::registry::{Deletion, DonorForm, Interaction, Registration, TargetEditor};
use bloodbank::view::{self, html, text};
use bloodbank::{init_logging, Config, DonorRecord, Registry, Repository, Storage, TargetTable};

/// Prompts on stderr and reads answers from stdin.
#[derive(Debug)]
struct TerminalInteraction {
    assume_yes: bool,
}

impl TerminalInteraction {
    fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    /// Ask for a line of input. `None` on end of input or a read error.
    fn ask(&mut self, question: &str) -> Option<String> {
        eprint!("{question}");
        let _ = io::stderr().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

impl Interaction for TerminalInteraction {
    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            debug!("Assuming yes: {}", message);
            return true;
        }
        self.ask(&format!("{message} [y/N] "))
            .is_some_and(|answer| matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn notify(&mut self, message: &str) {
        println!("{message}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        command => run(&config, command),
    }
}

fn run(config: &Config, command: Command) -> Result<()> {
    let db_path = config.database_path();
    let storage = Storage::open(&db_path)
        .with_context(|| format!("Failed to open registry at {}", db_path.display()))?;
    let registry = Registry::new(&storage, config.registration);

    match command {
        Command::Register(cmd) => handle_register(&registry, cmd),
        Command::Home(cmd) => {
            let (donors, targets) = registry.snapshot();
            print_home(&donors, &targets, cmd.format)
        }
        Command::Availability(cmd) => {
            let (donors, targets) = registry.snapshot();
            print_availability(&donors, &targets, config, cmd.format)
        }
        Command::Donors(cmd) => {
            let (donors, _) = registry.snapshot();
            print_donors(&donors, cmd.format)
        }
        Command::Delete(cmd) => handle_delete(&registry, config, &cmd),
        Command::Targets(cmd) => handle_targets(&registry, config, &cmd),
        Command::Storage(cmd) => handle_storage(&storage, &cmd),
        Command::Debug(cmd) => handle_debug(&storage, &cmd),
        Command::Config(cmd) => handle_config(config, cmd),
    }
}

fn handle_register(registry: &Registry<&Storage>, cmd: RegisterCommand) -> Result<()> {
    let mut ui = TerminalInteraction::new(cmd.yes);
    let mut form = DonorForm {
        name: cmd.name,
        age: cmd.age,
        blood_group: cmd.blood_group,
        contact: cmd.contact,
        city: cmd.city,
    };

    let outcome = registry.register(&mut form, &mut ui)?;
    match &outcome {
        Registration::Committed(record) => {
            println!("Donor id:      {}", record.id);
            let (donors, targets) = registry.snapshot();
            print!("{}", text::home(&view::home_stats(&donors, &targets)));
        }
        Registration::Rejected(_) => {}
        Registration::Declined => println!("Registration cancelled."),
    }
    registration_status(&outcome)
}

/// A rejected form fails the command so scripts can detect it.
fn registration_status(outcome: &Registration) -> Result<()> {
    match outcome {
        Registration::Rejected(rejection) => Err(anyhow!("registration rejected: {rejection}")),
        Registration::Committed(_) | Registration::Declined => Ok(()),
    }
}

fn handle_delete(registry: &Registry<&Storage>, config: &Config, cmd: &DeleteCommand) -> Result<()> {
    let mut ui = TerminalInteraction::new(cmd.yes);
    match registry.delete(cmd.id, &mut ui)? {
        Deletion::Deleted(record) => {
            println!(
                "Deleted {} ({}, {}).",
                record.name, record.blood_group, record.id
            );
            let (donors, targets) = registry.snapshot();
            print_refreshed(&donors, &targets, config);
        }
        Deletion::NotFound => println!("No donor with id {}.", cmd.id),
        Deletion::Declined => println!("Nothing deleted."),
    }
    Ok(())
}

fn handle_targets(
    registry: &Registry<&Storage>,
    config: &Config,
    cmd: &TargetsCommand,
) -> Result<()> {
    match cmd {
        TargetsCommand::Show { format } => {
            let editor = registry.target_editor();
            match *format {
                OutputFormat::Plain => print!("{}", text::targets(&editor)),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&editor.to_table())?);
                }
                OutputFormat::Html => print!("{}", html::target_controls(&editor)),
            }
            return Ok(());
        }
        TargetsCommand::Set { assignments } => {
            let mut editor = registry.target_editor();
            for assignment in assignments {
                editor.apply_assignment(assignment)?;
            }
            registry.save_targets(&editor, &mut TerminalInteraction::new(true))?;
        }
        TargetsCommand::Edit => {
            let mut ui = TerminalInteraction::new(false);
            let mut editor = registry.target_editor();
            let inputs = editor.inputs().to_vec();
            for input in inputs {
                let question = format!("{} target [{}]: ", input.group, input.value);
                match ui.ask(&question) {
                    Some(answer) if !answer.trim().is_empty() => {
                        editor.set_input(input.group, answer);
                    }
                    Some(_) => {}
                    None => {
                        println!();
                        println!("Targets unchanged.");
                        return Ok(());
                    }
                }
            }
            registry.save_targets(&editor, &mut ui)?;
        }
        TargetsCommand::Reset { yes } => {
            let mut ui = TerminalInteraction::new(*yes);
            if !ui.confirm("Restore the built-in targets?") {
                println!("Targets unchanged.");
                return Ok(());
            }
            let editor = TargetEditor::seeded(&TargetTable::default());
            registry.save_targets(&editor, &mut ui)?;
        }
    }

    let (donors, targets) = registry.snapshot();
    print_refreshed(&donors, &targets, config);
    Ok(())
}

fn handle_storage(storage: &Storage, cmd: &StorageCommand) -> Result<()> {
    match cmd {
        StorageCommand::Stats { json } => {
            let stats = storage.stats()?;
            if *json {
                let value = serde_json::json!({
                    "database_path": storage.path(),
                    "donor_count": stats.donor_count,
                    "targets_saved": stats.targets_saved,
                    "last_updated": stats.last_updated,
                    "db_size_bytes": stats.db_size_bytes,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("bbank storage");
                println!("-------------");
                println!("Database:      {}", storage.path().display());
                println!("Donors:        {}", stats.donor_count);
                println!(
                    "Targets:       {}",
                    if stats.targets_saved { "saved" } else { "defaults" }
                );
                println!(
                    "Last updated:  {}",
                    stats.last_updated.as_deref().unwrap_or("never")
                );
                println!("Size:          {} bytes", stats.db_size_bytes);
            }
        }
    }
    Ok(())
}

fn handle_debug(storage: &Storage, cmd: &DebugCommand) -> Result<()> {
    match cmd {
        DebugCommand::GetDonors => {
            println!("{}", serde_json::to_string_pretty(&storage.load_donors())?);
        }
        DebugCommand::SetDonors { json } => {
            let donors: Vec<DonorRecord> =
                serde_json::from_str(json).context("Expected a JSON array of donor records")?;
            storage.save_donors(&donors)?;
            println!("Stored {} donors.", donors.len());
        }
        DebugCommand::GetTargets => {
            println!("{}", serde_json::to_string_pretty(&storage.load_targets())?);
        }
        DebugCommand::SetTargets { json } => {
            let targets = TargetTable::from_json_lenient(json)
                .ok_or_else(|| anyhow!("Expected a JSON object mapping blood groups to targets"))?;
            storage.save_targets(&targets)?;
            println!("Stored targets for {} groups.", targets.len());
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Registration]");
                println!("  Min age:            {}", config.registration.min_age);
                println!("  Max age:            {}", config.registration.max_age);
                println!();
                println!("[Display]");
                println!("  Bar width:          {}", config.display.bar_width);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

/// Re-render the views that depend on the donor list and targets.
fn print_refreshed(donors: &[DonorRecord], targets: &TargetTable, config: &Config) {
    println!();
    print!(
        "{}",
        text::refreshed(&view::render(donors, targets), config.display.bar_width)
    );
}

fn print_home(donors: &[DonorRecord], targets: &TargetTable, format: OutputFormat) -> Result<()> {
    let stats = view::home_stats(donors, targets);
    match format {
        OutputFormat::Plain => print!("{}", text::home(&stats)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Html => print!("{}", html::home(&stats)),
    }
    Ok(())
}

fn print_availability(
    donors: &[DonorRecord],
    targets: &TargetTable,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let cards = view::availability(donors, targets);
    let table = view::donor_table(donors);
    match format {
        OutputFormat::Plain => {
            print!("{}", text::availability(&cards, config.display.bar_width));
            println!();
            print!("{}", text::donor_table(&table));
        }
        OutputFormat::Json => {
            let value = serde_json::json!({ "availability": cards, "donors": table });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Html => {
            print!("{}", html::availability(&cards));
            print!("{}", html::donor_table(&table));
        }
    }
    Ok(())
}

fn print_donors(donors: &[DonorRecord], format: OutputFormat) -> Result<()> {
    let table = view::donor_table(donors);
    match format {
        OutputFormat::Plain => print!("{}", text::donor_table(&table)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
        OutputFormat::Html => print!("{}", html::donor_table(&table)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloodbank::registry::FormRejection;

    #[test]
    fn test_rejected_registration_fails_the_command() {
        let outcome = Registration::Rejected(FormRejection::MissingField("name"));
        let err = registration_status(&outcome).unwrap_err();
        assert_eq!(err.to_string(), "registration rejected: name is required");
    }

    #[test]
    fn test_declined_registration_succeeds() {
        assert!(registration_status(&Registration::Declined).is_ok());
    }
}
