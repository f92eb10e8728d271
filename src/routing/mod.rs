//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (normalize, scan bindings)
//!     → matcher.rs (segment-aware prefix match, match length)
//!     → Return: the longest matching binding, or the catch-all
//!
//! Registry Compilation (at startup):
//!     RouteConfig[]
//!     → Parse patterns, reject duplicates
//!     → Require a catch-all binding
//!     → Freeze as immutable HandlerRegistry
//! ```
//!
//! # Design Decisions
//! - Registry built at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same path always resolves to the same handler
//! - Longest match wins; equal lengths go to the first declared binding
//! - Resolution never fails because a catch-all is mandatory

pub mod matcher;
pub mod router;

pub use matcher::{PathPattern, PatternError};
pub use router::{HandlerId, HandlerRegistry, PathBinding, RegistryBuilder, RegistryError};
