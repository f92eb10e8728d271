//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, bind address parses)
//! - Detect conflicting routes and a missing catch-all
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{HandlerConfig, ServerConfig};
use crate::routing::PathPattern;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("route {index}: {reason}")]
    Route { index: usize, reason: String },
    #[error("routes: no catch-all route for '/'")]
    MissingCatchAll,
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero("listener.max_connections"));
    }
    if config.limits.max_head_bytes == 0 {
        errors.push(ValidationError::Zero("limits.max_head_bytes"));
    }
    if config.limits.max_headers == 0 {
        errors.push(ValidationError::Zero("limits.max_headers"));
    }
    if config.timeouts.read_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.read_secs"));
    }
    if config.timeouts.write_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.write_secs"));
    }

    let mut seen: Vec<PathPattern> = Vec::with_capacity(config.routes.len());
    for (index, route) in config.routes.iter().enumerate() {
        match PathPattern::parse(&route.prefix) {
            Ok(pattern) => {
                if seen.contains(&pattern) {
                    errors.push(ValidationError::Route {
                        index,
                        reason: format!("prefix {pattern} is already bound"),
                    });
                } else {
                    seen.push(pattern);
                }
            }
            Err(e) => errors.push(ValidationError::Route {
                index,
                reason: e.to_string(),
            }),
        }

        if let HandlerConfig::Redirect { location } = &route.handler {
            if location.trim().is_empty() {
                errors.push(ValidationError::Route {
                    index,
                    reason: "redirect location is empty".into(),
                });
            }
        }
    }

    if !seen.iter().any(PathPattern::is_catch_all) {
        errors.push(ValidationError::MissingCatchAll);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
