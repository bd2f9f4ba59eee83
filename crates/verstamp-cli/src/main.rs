#![deny(unsafe_code)]

//! verstamp CLI: stamps a build-identity record into a project's static assets.
//!
//! Meant to be invoked as a build step (for example from a `postbuild`
//! script) once the bundle has been produced.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use verstamp_config::{AppConfig, CONFIG_FILE_NAME};
use verstamp_core::hook::BuildReport;
use verstamp_core::build_info::ToolInfo;
use verstamp_core::{
    BuildContext, BuildMode, BuildPipeline, FixedClock, VersionRecord, VersionStampPlugin,
};

/// verstamp: write a timestamped version record into a web project's static assets.
#[derive(Parser)]
#[command(name = "verstamp", version, about, long_about = None)]
struct Cli {
    /// Project root; relative paths in the configuration resolve against it.
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Path to configuration file [default: <root>/verstamp.toml].
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the build hooks and write the version record.
    Stamp {
        /// Build mode; the record is only written for "build".
        #[arg(long, default_value = "build")]
        mode: BuildMode,

        /// Pin the build timestamp (milliseconds since the Unix epoch).
        #[arg(long, env = "VERSTAMP_TIMESTAMP")]
        timestamp: Option<i64>,
    },

    /// Validate and print the version record currently on disk.
    Show,

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let explicit = cli.config.is_some();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.root.join(CONFIG_FILE_NAME));
    let (config, from_file) = load_config(&config_path, explicit).await?;

    init_tracing(cli.verbose, &config.logging.level);
    if !from_file {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    match cli.command {
        Commands::Stamp { mode, timestamp } => {
            cmd_stamp(&cli.root, &config, mode, timestamp)?;
        }
        Commands::Show => {
            let record = cmd_show(&cli.root, &config)?;
            println!("{}", record.to_json(true)?);
        }
        Commands::Config { show } => cmd_config(&config_path, &config, show)?,
    }

    Ok(())
}

fn init_tracing(verbose: u8, configured_level: &str) {
    // Set up tracing subscriber with verbosity level
    let filter = match verbose {
        0 => configured_level,
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();
}

fn cmd_stamp(
    root: &Path,
    config: &AppConfig,
    mode: BuildMode,
    timestamp: Option<i64>,
) -> Result<BuildReport> {
    debug!(tool = %ToolInfo::current(), "Starting build hooks");

    let mut plugin = VersionStampPlugin::new(config.stamp.clone());
    if let Some(ts) = timestamp {
        info!(timestamp = ts, "Using pinned build timestamp");
        plugin = plugin.with_clock(Arc::new(FixedClock(ts)));
    }

    let mut pipeline = BuildPipeline::new();
    pipeline.register(Box::new(plugin))?;

    let report = pipeline.run(&BuildContext::new(root, mode))?;
    if report.executed.is_empty() {
        info!(%mode, "No hooks applied, version file left untouched");
    }
    Ok(report)
}

fn cmd_show(root: &Path, config: &AppConfig) -> Result<VersionRecord> {
    let plugin = VersionStampPlugin::new(config.stamp.clone());
    let path = plugin.target_path(root);
    let record = plugin
        .read_current(root)
        .with_context(|| format!("no valid version record at '{}'", path.display()))?;
    Ok(record)
}

fn cmd_config(config_path: &Path, config: &AppConfig, show: bool) -> Result<()> {
    if show {
        let toml_str =
            toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {e}"))?;
        println!("{toml_str}");
    } else {
        println!("Configuration at '{}' is valid.", config_path.display());
    }
    Ok(())
}

/// Load the configuration.
///
/// Falls back to defaults only when the path is the implicit
/// `<root>/verstamp.toml` and nothing exists there. The flag reports whether
/// a file was loaded.
async fn load_config(path: &Path, explicit: bool) -> Result<(AppConfig, bool)> {
    let exists = tokio::fs::try_exists(path)
        .await
        .with_context(|| format!("cannot access configuration at '{}'", path.display()))?;
    if !exists && !explicit {
        return Ok((AppConfig::default(), false));
    }

    let config = AppConfig::load(path)
        .await
        .with_context(|| format!("invalid configuration at '{}'", path.display()))?;
    Ok((config, true))
}
