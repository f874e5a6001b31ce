//! Sauna Viewer - Native entry point

use anyhow::{Context, Result};
use clap::Parser;
use sauna_core::ViewerConfig;
use sauna_scene::app::{self, AppOptions};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "sauna-viewer")]
#[command(about = "Interactive 3D product viewer for the outdoor sauna")]
#[command(version)]
struct Args {
    /// Viewer config (TOML, or JSON with a .json extension); defaults to the built-in catalog
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model path override, relative to the asset directory
    #[arg(short, long)]
    model: Option<String>,

    /// Directory assets are loaded from
    #[arg(long, default_value = "assets")]
    assets: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Sauna Viewer v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("loading viewer config from {}", path.display()))?,
        None => ViewerConfig::builtin().context("parsing the built-in sauna catalog")?,
    };

    if let Some(model) = args.model {
        config.model.path = model;
    }

    info!(
        model = %config.model.path,
        hotspots = config.hotspots.len(),
        "Configuration loaded"
    );

    app::run(
        config,
        AppOptions {
            asset_root: args.assets,
            ..AppOptions::default()
        },
    );

    Ok(())
}
