//! # Flipbook Server
//!
//! Converts uploaded or linked SVG/GIF sources to PNG stills or MP4 clips.
//!
//! Configuration is read from `flipbook.toml` (or `--config` /
//! `FLIPBOOK_CONFIG`), environment variables and an optional `.env` file.
//! Logging honours `RUST_LOG`.

use anyhow::Context;
use clap::Parser;
use flipbook_config::{ConfigLoad, ConfigLoader};
use flipbook_server::{
    AppState, create_app,
    infra::app_state::build_http_client,
    transcode::build_transcoder,
};
use std::{net::SocketAddr, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "flipbook-server")]
#[command(about = "Converts SVG and GIF sources to PNG stills or MP4 clips")]
struct Cli {
    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to a `.env` file (defaults to `./.env`)
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config.clone() {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = cli.env_file.clone() {
        loader = loader.with_env_file(path);
    }

    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host.clone() {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = config.metadata.config_path.as_ref() {
        info!(path = %path.display(), "configuration file loaded");
    }

    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }

    let http = build_http_client(&config.fetch)?;
    let transcoder = build_transcoder(&config, http.clone())
        .context("failed to initialise transcoder")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    info!(
        backend = transcoder.backend(),
        svg_strategy = ?config.sniff.svg_strategy,
        dev_mode = config.dev_mode,
        "starting Flipbook on {}",
        addr
    );

    let state = AppState::new(config, http, transcoder);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
