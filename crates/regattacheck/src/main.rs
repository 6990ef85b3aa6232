//! `regcheck` - CLI for regattacheck
//!
//! This binary is the operator surface over the offline store: roster
//! ingestion, the check workflow, progress reporting, and dolly tracking.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use regattacheck::cli::{
    CheckCommand, Cli, Command, ConfigCommand, DollyCommand, EventsCommand, IngestCommand,
    ProgressCommand, ResetCommand,
};
use regattacheck::identity::flag_emoji;
use regattacheck::model::RosterUpload;
use regattacheck::{init_logging, Config, Store};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Ingest(cmd) => handle_ingest(&config, &cmd),
        Command::Check(cmd) => handle_check(&config, &cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Events(cmd) => handle_events(&config, &cmd),
        Command::Progress(cmd) => handle_progress(&config, &cmd),
        Command::Dollies(cmd) => handle_dollies(&config, &cmd),
        Command::Reset(cmd) => handle_reset(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_store(config: &Config) -> anyhow::Result<Store> {
    let path = config.database_path();
    Store::open(&path).with_context(|| format!("opening database at {}", path.display()))
}

fn handle_ingest(config: &Config, cmd: &IngestCommand) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&cmd.file)
        .with_context(|| format!("reading {}", cmd.file.display()))?;
    let rows: Vec<RosterUpload> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing roster rows from {}", cmd.file.display()))?;

    // Filtering malformed rows is this collaborator's job, not the store's.
    let total = rows.len();
    let rows: Vec<RosterUpload> = rows
        .into_iter()
        .filter(|r| !r.sail.trim().is_empty() && !r.crew.trim().is_empty())
        .collect();
    let skipped = total - rows.len();
    if skipped > 0 {
        eprintln!("Skipped {skipped} row(s) with a blank sail or crew.");
    }

    if rows.is_empty() {
        anyhow::bail!("no valid roster rows in {}", cmd.file.display());
    }

    let mut store = open_store(config)?;
    let meta = store.replace_roster(&rows)?;

    println!(
        "Loaded {} sailors across {} class(es): {}",
        meta.row_count,
        meta.classes.len(),
        meta.classes.join(", ")
    );
    Ok(())
}

fn handle_check(config: &Config, cmd: &CheckCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;

    if !store.is_ready()? {
        anyhow::bail!("no roster loaded; run `regcheck ingest` first");
    }

    let Some(entry) = store.find_by_identity(cmd.class.as_deref(), &cmd.sail)? else {
        anyhow::bail!(
            "no competitor matching sail \"{}\"{}",
            cmd.sail,
            cmd.class
                .as_deref()
                .map(|c| format!(" in class {c}"))
                .unwrap_or_default()
        );
    };

    let record = store.append_event(cmd.action.into(), &entry, cmd.origin.into())?;

    let flag = flag_emoji(entry.country.as_deref().unwrap_or(""));
    println!(
        "{} {}  {} {} (bow {}, sail {}) - {}",
        record.action,
        record.ts.format("%H:%M:%S"),
        flag,
        entry.crew,
        entry.bow,
        entry.sail,
        entry.class_name
    );
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let meta = store.meta()?;
    let roster_count = store.roster_count()?;
    let event_count = store.event_count()?;

    if json {
        let status = serde_json::json!({
            "ready": meta.is_some(),
            "meta": meta,
            "roster_count": roster_count,
            "event_count": event_count,
            "database_path": config.database_path(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("regcheck status");
        println!("---------------");
        println!("Database:   {}", config.database_path().display());
        match meta {
            Some(meta) => {
                println!("Roster:     {} rows ({} stored)", meta.row_count, roster_count);
                println!("Classes:    {}", meta.classes.join(", "));
                println!("Loaded at:  {}", meta.loaded_at.format("%Y-%m-%d %H:%M:%S"));
            }
            None => println!("Roster:     not loaded"),
        }
        println!("Events:     {event_count}");
    }
    Ok(())
}

fn handle_events(config: &Config, cmd: &EventsCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let mut events = store.list_events(cmd.action.map(Into::into))?;
    events.truncate(cmd.limit.unwrap_or(config.display.recent_events));

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("No events recorded.");
        return Ok(());
    }

    for e in &events {
        println!(
            "{}  {:<9}  {:<10}  {}  (bow {}, sail {}, via {})",
            e.ts.format("%Y-%m-%d %H:%M:%S"),
            e.action.to_string(),
            e.class_name,
            e.crew,
            e.bow,
            e.sail,
            e.origin
        );
    }
    Ok(())
}

fn handle_progress(config: &Config, cmd: &ProgressCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let progress = store.snapshot_progress(cmd.action.into())?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&progress)?);
        return Ok(());
    }

    if progress.is_empty() {
        println!("No roster loaded.");
        return Ok(());
    }

    println!("{:<16} {:>6} {:>6}", "Class", "Total", "Done");
    for p in &progress {
        println!("{:<16} {:>6} {:>6}", p.class_name, p.total, p.done);
    }
    Ok(())
}

fn handle_dollies(config: &Config, cmd: &DollyCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;

    match cmd {
        DollyCommand::Ensure => {
            let created = store.ensure_dollies()?;
            println!("Created {created} dolly entr(ies).");
        }
        DollyCommand::List { class, json } => {
            let dollies = store.list_dollies(class.as_deref())?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&dollies)?);
            } else if dollies.is_empty() {
                println!("No dolly entries.");
            } else {
                for d in &dollies {
                    println!(
                        "{:<10} bow {:>3}  dolly {:>3}  {:<8} {}",
                        d.class_name,
                        d.bow,
                        d.dolly,
                        d.status.to_string(),
                        d.note.as_deref().unwrap_or("")
                    );
                }
            }
        }
        DollyCommand::Set {
            class,
            bow,
            status,
            note,
        } => {
            let entry = store.set_dolly_status(class, *bow, (*status).into(), note.as_deref())?;
            println!(
                "{} bow {} - dolly {} is now {}{}",
                entry.class_name,
                entry.bow,
                entry.dolly,
                entry.status,
                entry
                    .note
                    .as_deref()
                    .map(|n| format!(" ({n})"))
                    .unwrap_or_default()
            );
        }
    }
    Ok(())
}

fn handle_reset(config: &Config, cmd: &ResetCommand) -> anyhow::Result<()> {
    if !cmd.yes {
        println!("This will clear the roster, all events, and all dolly entries.");
        println!("Use --yes to confirm.");
        return Ok(());
    }

    let mut store = open_store(config)?;
    store.reset()?;
    println!("Cleared roster, events, dollies, and metadata.");
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!();
                println!("[Display]");
                println!("  Recent events:  {}", config.display.recent_events);
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
