//! StudentSavvy - GPA tracking and study planning
//!
//! A CLI that keeps a student's grades, tasks, classes and study plan in a
//! local data file, computes semester and cumulative GPA, and uses a local
//! Ollama model for prediction commentary and study suggestions.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (I/O, data file, model service)
//!   2 - Invalid input (validation failure, rejected import, bad scale)

mod analysis;
mod assistant;
mod cli;
mod commands;
mod config;
mod error;
mod gradebook;
mod models;
mod planner;
mod report;
mod store;
mod transfer;

use anyhow::{Context, Result};
use cli::{Args, Command};
use commands::App;
use config::{Config, DEFAULT_CONFIG_FILE};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    // Handle init-config early (no logging needed)
    if let Command::InitConfig { force } = args.command {
        if let Err(e) = handle_init_config(force) {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Initialize logging
    init_logging(&args);

    info!("StudentSavvy v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Command failed: {:#}", e);
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

/// Map a failure to the process exit code.
fn exit_code(e: &anyhow::Error) -> i32 {
    e.downcast_ref::<error::Error>()
        .map(error::Error::exit_code)
        .unwrap_or(1)
}

/// Handle init-config: generate a default .studentsavvy.toml.
fn handle_init_config(force: bool) -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Remove it first, edit it manually, or pass --force.",
            DEFAULT_CONFIG_FILE
        );
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize the grading scale, model, and report defaults.");
    Ok(())
}

/// Initialize logging based on verbosity settings. Logs go to stderr so
/// that JSON output on stdout stays parseable.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration, open the data file and run the subcommand.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let data_file = resolve_data_file(&config);
    info!("Using data file {}", data_file.display());

    let mut app = App::open(config, data_file, args.json)?;
    commands::run_command(&mut app, args.command).await
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    config_or_default(Config::load_default())
}

/// Fall back to defaults when the default config file is missing or
/// unreadable. An invalid grading scale is an error: grades would
/// otherwise be checked against the wrong maximum.
fn config_or_default(loaded: Result<Option<Config>>) -> Result<Config> {
    match loaded {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) if matches!(e.downcast_ref::<error::Error>(), Some(error::Error::Scale(_))) => Err(e),
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

/// Pick the data file: flag or env var, then config, then the platform
/// data directory, then the working directory.
fn resolve_data_file(config: &Config) -> PathBuf {
    if let Some(ref path) = config.general.data_file {
        return path.clone();
    }
    dirs::data_dir()
        .map(|dir| dir.join("studentsavvy").join("state.json"))
        .unwrap_or_else(|| PathBuf::from("studentsavvy.json"))
}
