//! Per-request dispatch.
//!
//! # Data Flow
//! ```text
//! Request
//!     → HostValidationGate::check (400 on rejection, no handler runs)
//!     → HandlerRegistry::resolve_route(path)
//!     → Handler::handle(&Request, &mut ResponseBuilder)
//!     → ResponseBuilder returned for serialization
//! ```

use crate::http::gate::HostValidationGate;
use crate::http::request::Request;
use crate::http::response::{ResponseBuilder, StatusCode};
use crate::routing::HandlerRegistry;

/// Entry point that turns a parsed request into a response.
///
/// Holds only read-only state, so a single instance is shared by every
/// connection task.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    gate: HostValidationGate,
    registry: HandlerRegistry,
}

impl Dispatcher {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            gate: HostValidationGate::new(),
            registry,
        }
    }

    pub fn dispatch(&self, request: &Request) -> ResponseBuilder {
        if let Err(reason) = self.gate.check(request) {
            tracing::debug!(
                method = %request.method(),
                path = %request.path(),
                reason = %reason,
                "Request rejected by host gate"
            );
            return ResponseBuilder::with_status(StatusCode::BAD_REQUEST);
        }

        let (binding, handler) = self.registry.resolve_route(request.path());
        tracing::trace!(
            path = %request.path(),
            pattern = %binding.pattern(),
            handler = handler.kind(),
            "Route resolved"
        );

        let mut response = ResponseBuilder::new();
        handler.handle(request, &mut response);
        response
    }
}
