//! Request handlers.
//!
//! # Data Flow
//! ```text
//! Dispatcher
//!     → HandlerRegistry::resolve(path) → &Handler
//!     → Handler::handle(&Request, &mut ResponseBuilder)
//! ```
//!
//! # Design Decisions
//! - The set of handler kinds is closed, so dispatch is an enum match
//! - Handlers are configured once at startup and never mutated afterwards

pub mod greeting;
pub mod redirect;

pub use greeting::GreetingHandler;
pub use redirect::RedirectHandler;

use crate::config::HandlerConfig;
use crate::http::request::Request;
use crate::http::response::ResponseBuilder;

/// A configured unit of behavior mounted on one or more prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handler {
    Redirect(RedirectHandler),
    Greeting(GreetingHandler),
}

impl Handler {
    /// Fill in `response` for `request`.
    pub fn handle(&self, request: &Request, response: &mut ResponseBuilder) {
        match self {
            Handler::Redirect(h) => h.handle(request, response),
            Handler::Greeting(h) => h.handle(request, response),
        }
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Handler::Redirect(_) => "redirect",
            Handler::Greeting(_) => "greeting",
        }
    }
}

impl From<RedirectHandler> for Handler {
    fn from(h: RedirectHandler) -> Self {
        Handler::Redirect(h)
    }
}

impl From<GreetingHandler> for Handler {
    fn from(h: GreetingHandler) -> Self {
        Handler::Greeting(h)
    }
}

impl From<&HandlerConfig> for Handler {
    fn from(config: &HandlerConfig) -> Self {
        match config {
            HandlerConfig::Redirect { location } => RedirectHandler::new(location.clone()).into(),
            HandlerConfig::Greeting { text } => match text {
                Some(text) => GreetingHandler::new(text.clone()).into(),
                None => GreetingHandler::default().into(),
            },
        }
    }
}
