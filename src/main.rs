//! hostgate server binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ net::listener ──▶ net::connection ──▶ http::request (parse)
//!                                                                │
//!                                                                ▼
//!                                   http::dispatcher ──▶ http::gate (Host check)
//!                                          │                    │ rejected
//!                                          ▼                    ▼
//!                                   routing::router       400 Bad Request
//!                                          │
//!                                          ▼
//!                                   handlers (redirect / greeting)
//!                                          │
//!     Client Response                      ▼
//!     ◀────────────── net::connection ◀── http::response (serialize)
//! ```

use std::path::PathBuf;

use clap::Parser;

use hostgate::config::{self, LogFormat, ServerConfig};
use hostgate::lifecycle::{self, signals, Shutdown};
use hostgate::observability;

#[derive(Parser, Debug)]
#[command(name = "hostgate")]
#[command(about = "Host-validating HTTP/1.x greeting server", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults reproduce the reference routes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override observability.log_level.
    #[arg(long)]
    log_level: Option<String>,

    /// Override observability.log_format.
    #[arg(long, value_parser = parse_log_format)]
    log_format: Option<LogFormat>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check_config: bool,
}

fn parse_log_format(raw: &str) -> Result<LogFormat, String> {
    match raw.to_ascii_lowercase().as_str() {
        "pretty" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        other => Err(format!("unknown log format {other:?} (expected pretty or json)")),
    }
}

fn load(cli: &Cli) -> Result<ServerConfig, config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => ServerConfig::default(),
    };

    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.observability.log_format = format;
    }

    config::validation::validate_config(&config).map_err(config::ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load(&cli)?;

    if cli.check_config {
        println!("configuration OK ({} routes)", config.routes.len());
        return Ok(());
    }

    observability::init_logging(&config.observability)?;
    tracing::info!("hostgate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        routes = config.routes.len(),
        "Configuration loaded"
    );

    let (server, listener) = lifecycle::prepare(config).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server_task = tokio::spawn(server.run(listener, server_shutdown));

    signals::wait_for_signal().await;
    shutdown.trigger();

    server_task.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}
