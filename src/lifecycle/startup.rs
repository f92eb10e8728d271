//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the server (and its frozen handler registry) from configuration
//! - Bind the listener last, so traffic only arrives once routing is ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal

use thiserror::Error;

use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::net::{Listener, ListenerError};
use crate::routing::RegistryError;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid route table: {0}")]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// Build the server, then bind its listener.
pub async fn prepare(config: ServerConfig) -> Result<(HttpServer, Listener), StartupError> {
    let listener_config = config.listener.clone();
    let server = HttpServer::new(config)?;
    let listener = Listener::bind(&listener_config).await?;
    Ok((server, listener))
}
