//! Command-line entry point for the builder core.
//!
//! # Responsibility
//! - Expose offline synthesis and draft inspection for local checks.
//! - Keep stdout machine-readable (JSON) so output can be piped.

use clap::{Args, Parser, Subcommand};
use ksb_builder_core::{
    core_version, init_logging, open_db, synthesize, BuilderConfig, DraftStore, LogLevel,
    SqliteDraftRepository, StaticReferenceCatalog, StandardId, SystemClock, UuidIdGenerator,
};
use log::info;
use serde_json::json;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

type CliResult = Result<(), Box<dyn Error>>;

/// KSB course builder tools
#[derive(Parser, Debug)]
#[command(name = "ksb-builder")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Absolute directory for rolling log files (logging is off when unset)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error (default depends on build profile)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the core version
    Version,

    /// Build the default module skeleton for a standard
    Synthesize {
        /// JSON array of reference items
        #[arg(long)]
        catalog: PathBuf,

        /// Standard to synthesize for
        #[arg(long)]
        standard: StandardId,

        /// Builder config (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Inspect or remove stored drafts
    Draft {
        #[command(subcommand)]
        command: DraftCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DraftCommands {
    /// Print the owner's draft as JSON
    Show(DraftTarget),
    /// Delete the owner's draft
    Clear(DraftTarget),
}

#[derive(Args, Debug)]
struct DraftTarget {
    /// Draft database file
    #[arg(long)]
    db: PathBuf,

    /// Draft owner id
    #[arg(long)]
    owner: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| LogLevel::default_for_build().as_str().to_string());
        if let Err(err) = init_logging(&level, &log_dir.to_string_lossy()) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Commands) -> CliResult {
    match command {
        Commands::Version => {
            println!("ksb_builder_core version={}", core_version());
            Ok(())
        }
        Commands::Synthesize {
            catalog,
            standard,
            config,
        } => run_synthesize(catalog, standard, config),
        Commands::Draft { command } => match command {
            DraftCommands::Show(target) => run_draft_show(target),
            DraftCommands::Clear(target) => run_draft_clear(target),
        },
    }
}

fn run_synthesize(catalog: PathBuf, standard: StandardId, config: Option<PathBuf>) -> CliResult {
    let config = match config {
        Some(path) => BuilderConfig::from_file(path)?,
        None => BuilderConfig::default(),
    };
    let catalog = StaticReferenceCatalog::from_json_file(catalog)?;
    let items = catalog
        .items(standard)
        .ok_or_else(|| format!("standard {standard} not found in catalog"))?;

    let modules = synthesize(items, &UuidIdGenerator, config.seed_limits());
    info!(
        "event=cli_synthesize module=cli status=ok items={} modules={}",
        items.len(),
        modules.len()
    );
    println!("{}", serde_json::to_string_pretty(&modules)?);
    Ok(())
}

fn draft_store(target: &DraftTarget) -> Result<DraftStore<SqliteDraftRepository>, Box<dyn Error>> {
    let conn = open_db(&target.db)?;
    let repo = SqliteDraftRepository::try_new(conn)?;
    Ok(DraftStore::new(repo, Arc::new(SystemClock)))
}

fn run_draft_show(target: DraftTarget) -> CliResult {
    let store = draft_store(&target)?;
    let output = match store.load(&target.owner)? {
        Some(snapshot) => json!({
            "ownerId": snapshot.owner_id,
            "savedAt": snapshot.saved_at,
            "schemaVersion": snapshot.schema_version,
            "state": snapshot.state,
        }),
        None => serde_json::Value::Null,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_draft_clear(target: DraftTarget) -> CliResult {
    let store = draft_store(&target)?;
    let removed = store.clear(&target.owner)?;
    println!("{}", json!({ "removed": removed }));
    Ok(())
}
