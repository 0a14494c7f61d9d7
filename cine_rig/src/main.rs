//! cine_rig: interactive entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use cine_rig::app::{run, run_headless};
use cine_rig::RigConfig;

/// Command-line arguments for cine_rig
#[derive(Parser, Debug)]
#[command(name = "cine_rig")]
#[command(version, about = "Gesture-driven cinematic camera rig", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "CINE_RIG_CONFIG", default_value = "cine_rig.toml")]
    config: PathBuf,

    /// Skip the config file and use built-in defaults
    #[arg(long)]
    quick: bool,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Run this many seconds without a window, with a scripted hand
    #[arg(long, value_name = "SECONDS")]
    headless: Option<f64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Config first: its [logging] level seeds the filter.
    let (cfg, load_error) = if args.quick {
        (RigConfig::default(), None)
    } else {
        match RigConfig::load(&args.config) {
            Ok(cfg) => (cfg, None),
            Err(e)  => (RigConfig::default(), Some(e)),
        }
    };

    init_logging(args.verbose, &cfg.logging.level);

    info!("════════════════════════════════════════════════════════");
    info!("  cine_rig v{}", env!("CARGO_PKG_VERSION"));
    #[cfg(feature = "leap")]
    info!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    info!("  Mode: keyboard simulation  (use --features leap for hardware)");
    info!("════════════════════════════════════════════════════════");

    if let Some(e) = load_error {
        warn!("Failed to load config: {}, using defaults", e);
    } else if args.quick {
        info!("Quick start: built-in defaults");
    } else {
        info!(path = %args.config.display(), "Configuration loaded");
    }
    tracing::debug!("Config: {:?}", cfg);

    if let Some(seconds) = args.headless {
        let store = run_headless(cfg, seconds).context("headless run failed")?;
        println!("{:#?}", store);
        return Ok(());
    }

    info!("Opening preview window");
    run(cfg).context("preview failed")?;
    info!("cine_rig shut down");
    Ok(())
}

fn init_logging(verbose: u8, config_level: &str) {
    let level = match verbose {
        0 => config_level,
        1 => "debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .compact()
        .init();
}
