//! Unconditional redirect.

use crate::http::request::Request;
use crate::http::response::{ResponseBuilder, StatusCode};

/// Answers every request with `302 Found` pointing at a fixed location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectHandler {
    target: String,
}

impl RedirectHandler {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn handle(&self, _request: &Request, response: &mut ResponseBuilder) {
        response
            .set_status(StatusCode::FOUND)
            .set_header("Location", self.target.as_str())
            .set_body(Vec::new());
    }
}
