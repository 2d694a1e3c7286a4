//! HTTP fetcher tests against a local canned-response server.

#![cfg(feature = "remote")]

use configd_client::core::ClientIdentity;
use configd_client::prelude::*;
use configd_client::sources::HttpFetcher;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_test::{assert_err, assert_ok};

const CONFIG_BODY: &str = r#"{
    "schema_id": "custom-schema",
    "id": "dev",
    "name": "Development",
    "data": {"env": "dev", "rate_limit": 1.5},
    "valid": true,
    "checksum": "9f86d081",
    "accesses": [
        {
            "source": "billing",
            "instance": "billing-1",
            "timestamp": "2024-03-01T10:00:00Z",
            "previous": null
        }
    ],
    "created_at": "2024-01-01T00:00:00Z",
    "updated_at": "2024-03-01T09:00:00Z",
    "version": 7
}"#;

/// Serve one canned response; resolves to the raw request head, lowercased.
async fn serve_once(status: &str, body: &str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        let _ = tx.send(String::from_utf8_lossy(&request).to_lowercase());
    });

    (url, rx)
}

fn fetcher(url: &str, password: Option<&str>) -> HttpFetcher {
    let identity = ClientIdentity::new(url, "billing", "billing-1", password).unwrap();
    HttpFetcher::new(&identity, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_decodes_snapshot() {
    let (url, request) = serve_once("200 OK", CONFIG_BODY).await;

    let snapshot = assert_ok!(fetcher(&url, None).fetch("custom-schema", "dev").await);
    assert_eq!(snapshot.version, 7);
    assert_eq!(snapshot.checksum, "9f86d081");
    assert_eq!(snapshot.data["rate_limit"], 1.5);
    assert_eq!(
        snapshot.last_access().map(|a| a.instance.as_str()),
        Some("billing-1")
    );

    let request = request.await.unwrap();
    assert!(request.starts_with("get /schemas/custom-schema/configs/dev http/1.1"));
    assert!(request.contains("x-configd-source: billing\r\n"));
    assert!(request.contains("x-configd-instance: billing-1\r\n"));
    assert!(!request.contains("x-configd-password"));
}

#[tokio::test]
async fn test_password_header_sent_when_set() {
    let (url, request) = serve_once("200 OK", CONFIG_BODY).await;

    assert_ok!(fetcher(&url, Some("s3cret")).fetch("custom-schema", "dev").await);

    let request = request.await.unwrap();
    assert!(request.contains("x-configd-password: s3cret\r\n"));
}

#[tokio::test]
async fn test_empty_password_is_omitted() {
    let (url, request) = serve_once("200 OK", CONFIG_BODY).await;

    assert_ok!(fetcher(&url, Some("")).fetch("custom-schema", "dev").await);

    let request = request.await.unwrap();
    assert!(!request.contains("x-configd-password"));
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let (url, request) = serve_once("200 OK", CONFIG_BODY).await;

    assert_ok!(fetcher(&format!("{url}/"), None).fetch("custom-schema", "dev").await);

    let request = request.await.unwrap();
    assert!(request.starts_with("get /schemas/custom-schema/configs/dev "));
}

#[tokio::test]
async fn test_non_success_status() {
    let (url, _request) = serve_once("404 Not Found", r#"{"code":"not_found"}"#).await;

    let err = assert_err!(fetcher(&url, None).fetch("custom-schema", "missing").await);
    assert_eq!(
        err,
        ClientError::Status {
            url: format!("{url}/schemas/custom-schema/configs/missing"),
            status: 404,
        }
    );
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_malformed_body() {
    let (url, _request) = serve_once("200 OK", r#"{"version": "#).await;

    let err = assert_err!(fetcher(&url, None).fetch("custom-schema", "dev").await);
    assert!(matches!(err, ClientError::Decode { .. }));
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = assert_err!(fetcher(&url, None).fetch("custom-schema", "dev").await);
    assert!(matches!(err, ClientError::Transport { .. }));
}

#[tokio::test]
async fn test_client_polls_over_http() {
    let (url, _request) = serve_once("200 OK", CONFIG_BODY).await;

    let client = assert_ok!(
        ConfigdClient::builder()
            .with_url(&url)
            .with_source("billing")
            .with_instance("billing-1")
            .build()
    );

    let (tx, rx) = oneshot::channel();
    let mut tx = Some(tx);
    let handle = assert_ok!(client.poll(
        "custom-schema",
        "dev",
        Duration::from_secs(1),
        move |snapshot: &ConfigSnapshot| -> std::result::Result<(), String> {
            if let Some(tx) = tx.take() {
                let _ = tx.send(snapshot.version);
            }
            Ok(())
        },
    ));

    assert_eq!(rx.await.unwrap(), 7);
    assert_eq!(handle.latest().map(|s| s.version), Some(7));
    handle.cancel();

    // The server only answers once; cancellation wins before the next fetch.
    assert_ok!(handle.wait().await);
}
