//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (accept loop, one task per connection)
//!     → request.rs (parse head and body into an immutable Request)
//!     → dispatcher.rs
//!         → gate.rs (Host header check)
//!         → routing (longest-prefix handler lookup)
//!         → handlers (fill the response)
//!     → response.rs (serialize)
//!     → Send to client, close
//! ```

pub mod dispatcher;
pub mod gate;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::Dispatcher;
pub use gate::{HostValidationGate, RejectionReason};
pub use request::{Headers, HttpVersion, Request, RequestParseError};
pub use response::{ResponseBuilder, StatusCode};
pub use server::HttpServer;
