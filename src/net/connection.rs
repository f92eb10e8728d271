//! Connection I/O and lifecycle tracking.
//!
//! # Responsibilities
//! - Read one fully buffered request from a stream, within size and time limits
//! - Write one serialized response back and close the write side
//! - Generate unique connection IDs for tracing
//! - Count live connections so shutdown can drain them

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::{LimitsConfig, TimeoutConfig};
use crate::http::request::{ParsedHead, Request, RequestParseError};
use crate::http::response::{ResponseBuilder, StatusCode};

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

const READ_CHUNK: usize = 4096;

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Failures while reading a request or writing a response.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("peer closed the connection before a full request arrived")]
    Closed,
    #[error(transparent)]
    Parse(#[from] RequestParseError),
    #[error("request head exceeds {0} bytes")]
    HeadTooLarge(usize),
    #[error("request body of {size} bytes exceeds {limit} bytes")]
    BodyTooLarge { size: usize, limit: usize },
}

impl ConnectionError {
    /// The response owed to the client for this failure, if any.
    ///
    /// Transport failures (timeouts, resets, early EOF) get none; the
    /// connection is simply closed.
    pub fn error_response(&self) -> Option<ResponseBuilder> {
        let status = match self {
            ConnectionError::Parse(RequestParseError::TooManyHeaders(_))
            | ConnectionError::HeadTooLarge(_) => StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
            ConnectionError::Parse(_) => StatusCode::BAD_REQUEST,
            ConnectionError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ConnectionError::Io(_) | ConnectionError::Timeout(_) | ConnectionError::Closed => {
                return None
            }
        };
        Some(ResponseBuilder::with_status(status))
    }
}

/// One accepted client connection carrying a single request/response exchange.
#[derive(Debug)]
pub struct Connection<S> {
    id: ConnectionId,
    stream: S,
    limits: LimitsConfig,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(id: ConnectionId, stream: S, limits: LimitsConfig, timeouts: &TimeoutConfig) -> Self {
        Self {
            id,
            stream,
            limits,
            read_timeout: Duration::from_secs(timeouts.read_secs),
            write_timeout: Duration::from_secs(timeouts.write_secs),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Read and parse one request, including any `Content-Length` body.
    pub async fn read_request(&mut self) -> Result<Request, ConnectionError> {
        let deadline = self.read_timeout;
        tokio::time::timeout(deadline, self.read_request_inner())
            .await
            .map_err(|_| ConnectionError::Timeout(deadline))?
    }

    async fn read_request_inner(&mut self) -> Result<Request, ConnectionError> {
        let max_head = self.limits.max_head_bytes;
        let mut buf: Vec<u8> = Vec::with_capacity(READ_CHUNK);
        let mut chunk = [0u8; READ_CHUNK];

        let (request, head_len) = loop {
            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                return Err(ConnectionError::Closed);
            }
            buf.extend_from_slice(&chunk[..n]);

            match Request::parse_head(&buf, self.limits.max_headers)? {
                ParsedHead::Complete { request, head_len } => {
                    if head_len > max_head {
                        return Err(ConnectionError::HeadTooLarge(max_head));
                    }
                    break (request, head_len);
                }
                ParsedHead::Partial if buf.len() > max_head => {
                    return Err(ConnectionError::HeadTooLarge(max_head));
                }
                ParsedHead::Partial => {}
            }
        };

        let body_len = request.content_length()?.unwrap_or(0);
        if body_len > self.limits.max_body_bytes {
            return Err(ConnectionError::BodyTooLarge {
                size: body_len,
                limit: self.limits.max_body_bytes,
            });
        }

        let mut body = buf.split_off(head_len);
        if body.len() < body_len {
            let missing = body_len - body.len();
            let start = body.len();
            body.resize(body_len, 0);
            if let Err(e) = self.stream.read_exact(&mut body[start..start + missing]).await {
                return Err(match e.kind() {
                    std::io::ErrorKind::UnexpectedEof => ConnectionError::Closed,
                    _ => ConnectionError::Io(e),
                });
            }
        }
        body.truncate(body_len);

        Ok(request.with_body(body))
    }

    /// Serialize `response`, flush it and close the write half.
    pub async fn write_response(
        &mut self,
        response: &ResponseBuilder,
        include_body: bool,
    ) -> Result<(), ConnectionError> {
        let bytes = response.to_bytes(include_body);
        let deadline = self.write_timeout;
        tokio::time::timeout(deadline, async {
            self.stream.write_all(&bytes).await?;
            self.stream.flush().await?;
            self.stream.shutdown().await
        })
        .await
        .map_err(|_| ConnectionError::Timeout(deadline))??;
        Ok(())
    }
}

/// Tracks active connections for graceful shutdown.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    /// Current count of active connections.
    active_count: Arc<AtomicU64>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new active connection. Returns a guard that decrements on drop.
    pub fn track(&self) -> ConnectionGuard {
        self.active_count.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            active_count: Arc::clone(&self.active_count),
            id: ConnectionId::new(),
        }
    }

    /// Get current active connection count.
    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }

    /// Wait until all connections are closed or `grace` elapses.
    ///
    /// Returns `true` when the server drained cleanly.
    pub async fn wait_idle(&self, grace: Duration) -> bool {
        let drained = async {
            while self.active_count.load(Ordering::SeqCst) > 0 {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        };
        tokio::time::timeout(grace, drained).await.is_ok()
    }
}

/// Guard that tracks a connection's lifetime.
/// Decrements active count when dropped.
#[derive(Debug)]
pub struct ConnectionGuard {
    active_count: Arc<AtomicU64>,
    id: ConnectionId,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(connection_id = %self.id, "Connection closed");
    }
}
