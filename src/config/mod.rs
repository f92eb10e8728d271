//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → HandlerRegistry built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once; the route table is frozen before traffic starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    HandlerConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig, RouteConfig,
    ServerConfig, TimeoutConfig,
};
pub use validation::ValidationError;
