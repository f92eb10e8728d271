//! Localized greeting page.

use crate::http::request::Request;
use crate::http::response::{ResponseBuilder, StatusCode};

pub const DEFAULT_GREETING: &str = "Hello";

/// Renders `<h1>{text} SimpleServlet</h1>` as `text/html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreetingHandler {
    text: String,
}

impl Default for GreetingHandler {
    fn default() -> Self {
        Self::new(DEFAULT_GREETING)
    }
}

impl GreetingHandler {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The exact page body served for every request.
    pub fn render(&self) -> String {
        format!("<h1>{} SimpleServlet</h1>", self.text)
    }

    pub fn handle(&self, _request: &Request, response: &mut ResponseBuilder) {
        response
            .set_status(StatusCode::OK)
            .set_header("Content-Type", "text/html")
            .set_body(self.render());
    }
}
