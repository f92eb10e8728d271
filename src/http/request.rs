//! Request model and HTTP/1.x head parsing.
//!
//! # Responsibilities
//! - Parse the request line and headers from raw bytes
//! - Normalize the request target into a path (and optional query)
//! - Expose case-insensitive, last-wins header lookup
//!
//! # Design Decisions
//! - The parsed `Request` is immutable; handlers only ever see `&Request`
//! - Header names keep their original spelling for logging, lookups ignore case
//! - Only HTTP/1.0 and HTTP/1.1 are accepted

use std::fmt;

use thiserror::Error;

/// Maximum number of header slots handed to the parser.
pub const DEFAULT_MAX_HEADERS: usize = 64;

/// Errors raised while turning bytes into a [`Request`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestParseError {
    /// The request line or a header line is not valid HTTP/1.x.
    #[error("malformed request: {0}")]
    Malformed(String),

    /// The client spoke something other than HTTP/1.0 or HTTP/1.1.
    #[error("unsupported HTTP version 1.{0}")]
    UnsupportedVersion(u8),

    /// The head has not been fully received yet.
    #[error("incomplete request head")]
    Incomplete,

    /// More header lines than the configured limit.
    #[error("too many headers (limit {0})")]
    TooManyHeaders(usize),

    /// Framing this server does not implement.
    #[error("unsupported framing: {0}")]
    UnsupportedFraming(&'static str),
}

/// Protocol version of an inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVersion {
    Http10,
    Http11,
}

impl HttpVersion {
    fn from_minor(minor: u8) -> Result<Self, RequestParseError> {
        match minor {
            0 => Ok(HttpVersion::Http10),
            1 => Ok(HttpVersion::Http11),
            other => Err(RequestParseError::UnsupportedVersion(other)),
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpVersion::Http10 => f.write_str("HTTP/1.0"),
            HttpVersion::Http11 => f.write_str("HTTP/1.1"),
        }
    }
}

/// Ordered header collection with case-insensitive names.
///
/// Inserting a name that already exists replaces its value in place, so
/// duplicates resolve last-wins while the first position is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a header.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a header value by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A fully parsed inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    path: String,
    query: Option<String>,
    headers: Headers,
    version: HttpVersion,
    body: Vec<u8>,
}

/// Outcome of parsing a buffer that may hold a partial head.
#[derive(Debug)]
pub enum ParsedHead {
    /// The head is complete; `head_len` bytes were consumed.
    Complete { request: Request, head_len: usize },
    /// More bytes are needed.
    Partial,
}

impl Request {
    /// Build a request directly, mainly for tests and in-process dispatch.
    pub fn new(method: impl Into<String>, target: &str, version: HttpVersion) -> Self {
        let (path, query) = split_target(target);
        Self {
            method: method.into(),
            path,
            query,
            headers: Headers::new(),
            version,
            body: Vec::new(),
        }
    }

    /// Attach a header, builder style.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Parse the head of a request from `buf`.
    ///
    /// Returns [`ParsedHead::Partial`] when the terminating blank line has
    /// not arrived yet. The body, if any, is not consumed here.
    pub fn parse_head(buf: &[u8], max_headers: usize) -> Result<ParsedHead, RequestParseError> {
        let mut storage = vec![httparse::EMPTY_HEADER; max_headers];
        let mut raw = httparse::Request::new(&mut storage);

        let head_len = match raw.parse(buf) {
            Ok(httparse::Status::Complete(len)) => len,
            Ok(httparse::Status::Partial) => return Ok(ParsedHead::Partial),
            Err(httparse::Error::TooManyHeaders) => {
                return Err(RequestParseError::TooManyHeaders(max_headers))
            }
            Err(e) => return Err(RequestParseError::Malformed(e.to_string())),
        };

        let method = raw
            .method
            .ok_or_else(|| RequestParseError::Malformed("missing method".into()))?;
        let target = raw
            .path
            .ok_or_else(|| RequestParseError::Malformed("missing request target".into()))?;
        let version = HttpVersion::from_minor(
            raw.version
                .ok_or_else(|| RequestParseError::Malformed("missing version".into()))?,
        )?;

        let mut headers = Headers::new();
        for header in raw.headers.iter() {
            let value = std::str::from_utf8(header.value).map_err(|_| {
                RequestParseError::Malformed(format!("non-UTF-8 value for header {}", header.name))
            })?;
            // repeated Content-Length must agree; identical repeats collapse
            if header.name.eq_ignore_ascii_case("content-length") {
                if let Some(previous) = headers.get("content-length") {
                    if previous.trim() != value.trim() {
                        return Err(RequestParseError::Malformed(
                            "conflicting content-length headers".into(),
                        ));
                    }
                }
            }
            headers.insert(header.name, value);
        }

        if headers
            .get("transfer-encoding")
            .is_some_and(|te| te.to_ascii_lowercase().contains("chunked"))
        {
            return Err(RequestParseError::UnsupportedFraming("chunked transfer-encoding"));
        }

        let (path, query) = split_target(target);
        Ok(ParsedHead::Complete {
            request: Request {
                method: method.to_string(),
                path,
                query,
                headers,
                version,
                body: Vec::new(),
            },
            head_len,
        })
    }

    /// Parse a complete request (head and body) held entirely in `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self, RequestParseError> {
        match Self::parse_head(buf, DEFAULT_MAX_HEADERS)? {
            ParsedHead::Partial => Err(RequestParseError::Incomplete),
            ParsedHead::Complete { request, head_len } => {
                let body_len = request.content_length()?.unwrap_or(0);
                let rest = &buf[head_len..];
                if rest.len() < body_len {
                    return Err(RequestParseError::Incomplete);
                }
                Ok(request.with_body(rest[..body_len].to_vec()))
            }
        }
    }

    /// Declared `Content-Length`, if any.
    pub fn content_length(&self) -> Result<Option<usize>, RequestParseError> {
        self.headers
            .get("content-length")
            .map(|raw| {
                raw.trim()
                    .parse::<usize>()
                    .map_err(|_| RequestParseError::Malformed(format!("bad content-length {raw:?}")))
            })
            .transpose()
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Normalized path, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn version(&self) -> HttpVersion {
        self.version
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn is_head(&self) -> bool {
        self.method.eq_ignore_ascii_case("HEAD")
    }
}

/// Collapse repeated leading slashes; an empty path becomes `/`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    let mut normalized = String::with_capacity(trimmed.len() + 1);
    normalized.push('/');
    normalized.push_str(trimmed);
    normalized
}

/// Split a request target into a normalized path and optional query.
fn split_target(target: &str) -> (String, Option<String>) {
    if target == "*" {
        return ("/".to_string(), None);
    }

    // absolute-form only when the target is not already origin-form
    let origin = if target.starts_with('/') {
        target
    } else {
        match target.find("://") {
            Some(idx) => {
                let after_scheme = &target[idx + 3..];
                match after_scheme.find(['/', '?']) {
                    Some(slash) => &after_scheme[slash..],
                    None => "",
                }
            }
            None => target,
        }
    };

    let origin = origin.split('#').next().unwrap_or_default();
    match origin.split_once('?') {
        Some((path, query)) => (normalize_path(path), Some(query.to_string())),
        None => (normalize_path(origin), None),
    }
}
