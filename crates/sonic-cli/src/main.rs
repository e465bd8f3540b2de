use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sonic_application::Sonic;
use sonic_config::load as load_config;
use sonic_domain::AudioAsset;
use sonic_fingerprint::Fingerprint;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Identify audio files against a fingerprint service.
#[derive(Debug, Parser)]
#[command(name = "sonic", version)]
struct Cli {
    /// TOML configuration file (SONIC_* environment variables override it).
    #[arg(long, global = true, env = "SONIC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a song with the primary service.
    Register {
        file: PathBuf,
        /// Song name; defaults to the file stem.
        #[arg(long)]
        name: Option<String>,
        /// Use the custom fingerprinting algorithm.
        #[arg(long)]
        custom: bool,
    },
    /// Recognize a clip and enrich confident matches with catalog metadata.
    Recognize {
        file: PathBuf,
        #[arg(long)]
        custom: bool,
    },
    /// Look up an fpcalc fingerprint on AcoustID.
    Lookup { fingerprint: String, duration: u32 },
    /// List registered songs.
    Songs,
    /// Delete a registered song.
    Delete { name: String },
    /// Probe the primary service.
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.telemetry.log_level);

    let sonic = Sonic::from_config(&config)?;
    run(&sonic, cli.command).await
}

async fn run(sonic: &Sonic, command: Command) -> Result<()> {
    match command {
        Command::Register { file, name, custom } => {
            let asset = read_asset(&file).await?;
            let name = match name {
                Some(name) => name,
                None => song_name_from_path(&file)?,
            };
            let result = sonic.primary().register(&asset, &name, custom).await?;
            print_json(&result)
        }
        Command::Recognize { file, custom } => {
            let asset = read_asset(&file).await?;
            let result = sonic
                .orchestrator()
                .recognize_and_enrich(&asset, custom)
                .await?;
            if result.is_weak() {
                info!(target: "cli", "weak or missing match; try `sonic lookup` with an fpcalc fingerprint");
            }
            print_json(&result)
        }
        Command::Lookup {
            fingerprint,
            duration,
        } => {
            let fingerprint = Fingerprint::new(fingerprint, duration);
            let candidates = sonic.acoustid().lookup_fingerprint(&fingerprint).await;
            print_json(&candidates)
        }
        Command::Songs => print_json(&sonic.primary().list_songs().await?),
        Command::Delete { name } => {
            sonic.primary().delete_song(&name).await?;
            info!(target: "cli", song = %name, "deleted");
            Ok(())
        }
        Command::Health => {
            let healthy = sonic.primary().check_health().await;
            print_json(&serde_json::json!({ "healthy": healthy }))?;
            if !healthy {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn init_tracing(default_level: &str) {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

async fn read_asset(path: &Path) -> Result<AudioAsset> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    Ok(AudioAsset::new(file_name, bytes))
}

fn song_name_from_path(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .with_context(|| format!("cannot derive a song name from {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
