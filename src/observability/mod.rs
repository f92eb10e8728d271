//! Observability subsystem.
//!
//! All subsystems emit structured `tracing` events; `logging.rs` installs
//! the subscriber that formats them. Connection and request spans carry
//! `connection_id` and `request_id` so a single exchange can be followed.

pub mod logging;

pub use logging::init_logging;
