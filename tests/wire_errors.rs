//! Framing failures and connection lifecycle.

mod common;

use std::time::Duration;

use common::{send_raw, start_server, start_server_with, status_of};
use hostgate::config::ServerConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

#[tokio::test]
async fn malformed_request_line_gets_generic_400() {
    let server = start_server().await;
    let response = send_raw(server.addr, "THIS IS NOT HTTP\r\n\r\n").await;
    assert_eq!(status_of(&response), 400, "response: {response}");
    server.stop().await;
}

#[tokio::test]
async fn unsupported_version_gets_400() {
    let server = start_server().await;
    let response = send_raw(server.addr, "GET / HTTP/2.0\r\nHost: x\r\n\r\n").await;
    assert_eq!(status_of(&response), 400);
    server.stop().await;
}

#[tokio::test]
async fn conflicting_content_lengths_get_400() {
    let server = start_server().await;
    let response = send_raw(
        server.addr,
        "POST /hello/ HTTP/1.1\r\nHost: x\r\nContent-Length: 5\r\nContent-Length: 2\r\n\r\nhello",
    )
    .await;
    assert_eq!(status_of(&response), 400, "response: {response}");
    server.stop().await;
}

#[tokio::test]
async fn chunked_body_is_refused() {
    let server = start_server().await;
    let response = send_raw(
        server.addr,
        "POST /hello/ HTTP/1.1\r\nHost: x\r\nTransfer-Encoding: chunked\r\n\r\n0\r\n\r\n",
    )
    .await;
    assert_eq!(status_of(&response), 400);
    server.stop().await;
}

#[tokio::test]
async fn oversized_head_gets_431() {
    let mut config = ServerConfig::default();
    config.limits.max_head_bytes = 128;
    let server = start_server_with(config).await;

    let raw = format!("GET /hello/ HTTP/1.1\r\nHost: x\r\nX-Filler: {}\r\n\r\n", "a".repeat(512));
    let response = send_raw(server.addr, &raw).await;
    assert_eq!(status_of(&response), 431);
    server.stop().await;
}

#[tokio::test]
async fn body_within_limit_is_accepted() {
    let server = start_server().await;
    let response = send_raw(
        server.addr,
        "POST /it/ HTTP/1.1\r\nHost: x\r\nContent-Length: 5\r\n\r\nhello",
    )
    .await;
    assert_eq!(status_of(&response), 200);
    server.stop().await;
}

#[tokio::test]
async fn idle_client_is_disconnected_without_response() {
    let mut config = ServerConfig::default();
    config.timeouts.read_secs = 1;
    let server = start_server_with(config).await;

    let mut client = TcpStream::connect(server.addr).await.unwrap();
    client.write_all(b"GET / HTTP/1.1\r\n").await.unwrap();

    let mut buf = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(5), client.read_to_end(&mut buf))
        .await
        .expect("server should close the idle connection");
    assert!(read.is_ok());
    assert!(buf.is_empty());
    server.stop().await;
}

#[tokio::test]
async fn shutdown_stops_accepting() {
    let server = start_server().await;
    let addr = server.addr;
    server.stop().await;

    let outcome = tokio::time::timeout(Duration::from_secs(2), TcpStream::connect(addr)).await;
    assert!(matches!(outcome, Ok(Err(_))), "listener should be closed");
}
