//! Host header validation.
//!
//! Every request must carry a non-blank `Host` header before any handler
//! runs. Only presence and non-blankness are checked; host-name syntax is
//! not validated.

use thiserror::Error;

use crate::http::request::Request;

/// Why the gate turned a request away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("request has no Host header")]
    MissingHost,
    #[error("request has an empty Host header")]
    EmptyHost,
}

/// Stateless gate applied ahead of routing.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostValidationGate;

impl HostValidationGate {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, request: &Request) -> Result<(), RejectionReason> {
        match request.header("host") {
            None => Err(RejectionReason::MissingHost),
            Some(host) if host.trim().is_empty() => Err(RejectionReason::EmptyHost),
            Some(_) => Ok(()),
        }
    }
}
