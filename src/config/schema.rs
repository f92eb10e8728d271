//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.
//! Defaults reproduce the reference deployment: port 9999 and the
//! hello/it/fr greeting routes behind a redirecting catch-all.

use serde::{Deserialize, Serialize};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, connection cap).
    pub listener: ListenerConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Ordered route table. Order breaks ties between equal-length matches.
    pub routes: Vec<RouteConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            limits: LimitsConfig::default(),
            timeouts: TimeoutConfig::default(),
            routes: default_routes(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// The reference route table.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new("/", HandlerConfig::Redirect { location: "/hello/".into() }),
        RouteConfig::new("/hello/*", HandlerConfig::Greeting { text: None }),
        RouteConfig::new(
            "/it/*",
            HandlerConfig::Greeting { text: Some("Buongiorno Mondo".into()) },
        ),
        RouteConfig::new(
            "/fr/*",
            HandlerConfig::Greeting { text: Some("Bonjour le Monde".into()) },
        ),
    ]
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:9999").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9999".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Limits applied while reading a request off the wire.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum size of the request line plus headers, in bytes.
    pub max_head_bytes: usize,

    /// Maximum number of header lines.
    pub max_headers: usize,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_head_bytes: 8 * 1024,
            max_headers: 64,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Timeout configuration for connection handling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed to receive a complete request, in seconds.
    pub read_secs: u64,

    /// Time allowed to flush the response, in seconds.
    pub write_secs: u64,

    /// How long shutdown waits for in-flight connections, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_secs: 30,
            write_secs: 30,
            shutdown_grace_secs: 10,
        }
    }
}

/// A single prefix binding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Path pattern, e.g. `/hello/*` or `/` for the catch-all.
    pub prefix: String,

    /// Handler mounted on the prefix.
    pub handler: HandlerConfig,
}

impl RouteConfig {
    pub fn new(prefix: impl Into<String>, handler: HandlerConfig) -> Self {
        Self {
            prefix: prefix.into(),
            handler,
        }
    }
}

/// Handler selection, tagged by `kind` in TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandlerConfig {
    /// `302 Found` to a fixed location.
    Redirect { location: String },

    /// Greeting page; text defaults to "Hello".
    Greeting {
        #[serde(default)]
        text: Option<String>,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
