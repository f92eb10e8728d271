//! hostgate: a small HTTP/1.x server that validates `Host`, routes by
//! longest path prefix and serves redirects and localized greetings.

pub mod config;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::{Dispatcher, HttpServer};
pub use lifecycle::Shutdown;
pub use routing::HandlerRegistry;
