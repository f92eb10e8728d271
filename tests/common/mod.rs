//! Shared utilities for integration and load testing.

use std::net::SocketAddr;

use hostgate::config::ServerConfig;
use hostgate::http::HttpServer;
use hostgate::lifecycle::Shutdown;
use hostgate::net::Listener;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A server running on an ephemeral loopback port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<()>,
}

impl TestServer {
    /// Trigger shutdown and wait for the accept loop to finish.
    #[allow(dead_code)]
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.task.await;
    }
}

/// Start a server with the reference configuration.
#[allow(dead_code)]
pub async fn start_server() -> TestServer {
    start_server_with(ServerConfig::default()).await
}

/// Start a server with `config`, ignoring its bind address.
pub async fn start_server_with(config: ServerConfig) -> TestServer {
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    let listener = Listener::from_tcp(tcp, config.listener.max_connections);

    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let task = tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        shutdown,
        task,
    }
}

/// Write `raw` on a fresh connection and read until the server closes it.
pub async fn send_raw(addr: SocketAddr, raw: &str) -> String {
    let mut client = TcpStream::connect(addr).await.unwrap();
    client.write_all(raw.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

/// Status code from the first line of a raw response.
pub fn status_of(raw_response: &str) -> u16 {
    raw_response
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or_else(|| panic!("no status line in {raw_response:?}"))
}

/// Body of a raw response (everything after the blank line).
#[allow(dead_code)]
pub fn body_of(raw_response: &str) -> &str {
    raw_response
        .split_once("\r\n\r\n")
        .map(|(_, body)| body)
        .unwrap_or_default()
}

/// Value of header `name` in a raw response.
#[allow(dead_code)]
pub fn header_of<'a>(raw_response: &'a str, name: &str) -> Option<&'a str> {
    let head = raw_response.split_once("\r\n\r\n")?.0;
    head.lines().skip(1).find_map(|line| {
        let (n, v) = line.split_once(':')?;
        n.trim().eq_ignore_ascii_case(name).then(|| v.trim())
    })
}

/// The browser-style HTTP/1.0 request used by the host header tests,
/// with an optional `Host` line.
#[allow(dead_code)]
pub fn legacy_request(path: &str, host_line: Option<&str>) -> String {
    let mut raw = format!("GET {path} HTTP/1.0\r\n");
    if let Some(host) = host_line {
        raw.push_str(&format!("Host: {host}\r\n"));
    }
    raw.push_str(
        "Accept-Charset: iso-8859-1,utf-8;q=0.9,*;q=0.1\r\n\
         Accept-Language: en\r\n\
         Connection: Close\r\n\
         User-Agent: Mozilla/4.0 (compatible; MSIE 8.0; Windows NT 5.1; Trident/4.0)\r\n\
         Pragma: no-cache\r\n\
         Accept: image/gif, image/x-xbitmap, image/jpeg, image/pjpeg, image/png, /\r\n\
         \r\n",
    );
    raw
}
