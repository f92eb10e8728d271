//! HTTP server: accept loop and per-connection handling.
//!
//! # Responsibilities
//! - Build the dispatcher from configuration
//! - Accept connections until shutdown is signalled
//! - Read one request per connection, dispatch it, write the response
//! - Answer framing errors with a bare 4xx before the dispatcher is involved
//! - Drain in-flight connections on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::broadcast;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::http::dispatcher::Dispatcher;
use crate::net::{Connection, ConnectionTracker, Listener, ListenerError};
use crate::routing::{HandlerRegistry, RegistryError};

/// HTTP server for the greeting routes.
pub struct HttpServer {
    dispatcher: Arc<Dispatcher>,
    config: ServerConfig,
    tracker: ConnectionTracker,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// The handler registry is built here and never changes afterwards.
    pub fn new(config: ServerConfig) -> Result<Self, RegistryError> {
        let registry = HandlerRegistry::from_routes(&config.routes)?;
        tracing::info!(
            routes = registry.bindings().len(),
            handlers = registry.handler_count(),
            "Handler registry frozen"
        );

        Ok(Self {
            dispatcher: Arc::new(Dispatcher::new(registry)),
            config,
            tracker: ConnectionTracker::new(),
        })
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Run the server until a shutdown signal arrives on `shutdown`.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(address = %addr, "HTTP server starting");
        }

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
                accepted = listener.accept() => {
                    let (stream, peer_addr, permit) = match accepted {
                        Ok(accepted) => accepted,
                        Err(ListenerError::Accept(e)) => {
                            tracing::warn!(
                                error = %e,
                                backoff_ms = ACCEPT_ERROR_BACKOFF.as_millis() as u64,
                                "Accept failed"
                            );
                            if accept_backoff(&mut shutdown).await {
                                tracing::info!("Shutdown signal received, no longer accepting");
                                break;
                            }
                            continue;
                        }
                        Err(e) => return Err(e),
                    };

                    let guard = self.tracker.track();
                    let connection = Connection::new(
                        guard.id(),
                        stream,
                        self.config.limits.clone(),
                        &self.config.timeouts,
                    );
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let span = tracing::debug_span!(
                        "connection",
                        connection_id = %guard.id(),
                        peer_addr = %peer_addr
                    );

                    tokio::spawn(
                        async move {
                            serve_connection(&dispatcher, connection, peer_addr).await;
                            drop(guard);
                            drop(permit);
                        }
                        .instrument(span),
                    );
                }
            }
        }

        drop(listener);
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        if self.tracker.wait_idle(grace).await {
            tracing::info!("HTTP server stopped");
        } else {
            tracing::warn!(
                remaining = self.tracker.active_count(),
                grace_secs = grace.as_secs(),
                "Shutdown grace period elapsed with connections still open"
            );
        }
        Ok(())
    }
}

/// Pause after a failed accept so persistent errors (EMFILE, ENFILE) do not
/// spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Sleep for [`ACCEPT_ERROR_BACKOFF`]; returns `true` if shutdown arrived first.
async fn accept_backoff(shutdown: &mut broadcast::Receiver<()>) -> bool {
    tokio::select! {
        _ = shutdown.recv() => true,
        _ = tokio::time::sleep(ACCEPT_ERROR_BACKOFF) => false,
    }
}

/// Serve the single request carried by `connection`.
pub async fn serve_connection<S>(
    dispatcher: &Dispatcher,
    mut connection: Connection<S>,
    peer_addr: SocketAddr,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let start_time = Instant::now();

    let request = match connection.read_request().await {
        Ok(request) => request,
        Err(e) => {
            match e.error_response() {
                Some(mut response) => {
                    tracing::debug!(
                        peer_addr = %peer_addr,
                        error = %e,
                        status = response.status().as_u16(),
                        "Rejecting unreadable request"
                    );
                    response.set_header("Connection", "close");
                    if let Err(write_err) = connection.write_response(&response, true).await {
                        tracing::debug!(error = %write_err, "Failed to write error response");
                    }
                }
                None => tracing::debug!(
                    connection_id = %connection.id(),
                    peer_addr = %peer_addr,
                    error = %e,
                    "Closing connection"
                ),
            }
            return;
        }
    };

    let request_id = Uuid::new_v4();
    let span = tracing::debug_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.path(),
        query = request.query().unwrap_or_default()
    );

    async {
        let mut response = dispatcher.dispatch(&request);
        response.set_header("Connection", "close");
        let status = response.status();

        if let Err(e) = connection.write_response(&response, !request.is_head()).await {
            tracing::debug!(error = %e, "Failed to write response");
            return;
        }

        tracing::debug!(
            status = status.as_u16(),
            elapsed_us = start_time.elapsed().as_micros() as u64,
            "Request completed"
        );
    }
    .instrument(span)
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::ConnectionId;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    async fn exchange(raw: &[u8]) -> String {
        let config = ServerConfig::default();
        let server = HttpServer::new(config.clone()).unwrap();
        let (mut client, stream) = duplex(8192);
        let connection = Connection::new(ConnectionId::new(), stream, config.limits, &config.timeouts);

        client.write_all(raw).await.unwrap();
        let peer: SocketAddr = "127.0.0.1:1".parse().unwrap();
        serve_connection(&server.dispatcher(), connection, peer).await;

        let mut wire = String::new();
        client.read_to_string(&mut wire).await.unwrap();
        wire
    }

    #[tokio::test]
    async fn french_greeting_over_http10() {
        let wire = exchange(b"GET /fr/anything HTTP/1.0\r\nHost: example\r\n\r\n").await;
        assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(wire.contains("Content-Type: text/html\r\n"));
        assert!(wire.contains("Connection: close\r\n"));
        assert!(wire.ends_with("\r\n\r\n<h1>Bonjour le Monde SimpleServlet</h1>"));
    }

    #[tokio::test]
    async fn no_host_is_bad_request_with_empty_body() {
        let wire = exchange(b"GET / HTTP/1.0\r\n\r\n").await;
        assert!(wire.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(wire.contains("Content-Length: 0\r\n"));
        assert!(wire.ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn head_keeps_headers_drops_body() {
        let wire = exchange(b"HEAD /hello/ HTTP/1.1\r\nHost: example\r\n\r\n").await;
        assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(wire.contains("Content-Length: 28\r\n"));
        assert!(wire.ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn garbage_gets_generic_bad_request() {
        let wire = exchange(b"\x00\x01\x02\r\n\r\n").await;
        assert!(wire.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn accept_backoff_waits_unless_shutting_down() {
        let (tx, mut rx) = broadcast::channel(1);

        let started = Instant::now();
        assert!(!accept_backoff(&mut rx).await);
        assert!(started.elapsed() >= ACCEPT_ERROR_BACKOFF);

        tx.send(()).unwrap();
        let started = Instant::now();
        assert!(accept_backoff(&mut rx).await);
        assert!(started.elapsed() < ACCEPT_ERROR_BACKOFF);
    }

    #[test]
    fn invalid_route_table_fails_construction() {
        let mut config = ServerConfig::default();
        config.routes.remove(0);
        assert!(matches!(
            HttpServer::new(config),
            Err(RegistryError::MissingCatchAll)
        ));
    }
}
