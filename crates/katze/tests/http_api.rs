//! HttpCatApi against a local one-shot HTTP server

use std::time::Duration;

use katze::api::{encode_image_url, ApiConfig, CatApi, FetchError, HttpCatApi};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const API_KEY: &str = "test-key";

/// Serve one request with `status` and `body`, returning the raw request head
async fn serve_once(status: &'static str, body: &'static [u8]) -> (String, JoinHandle<String>) {
    serve_once_after(status, body, Duration::ZERO).await
}

async fn serve_once_after(
    status: &'static str,
    body: &'static [u8],
    delay: Duration,
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }

        tokio::time::sleep(delay).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            body.len()
        );
        // The client may already have given up
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.write_all(body).await;
        let _ = stream.shutdown().await;

        String::from_utf8_lossy(&head).into_owned()
    });

    (base, handle)
}

fn api(base: &str, image_timeout: Duration) -> HttpCatApi {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let config = ApiConfig {
        base_url: base.to_string(),
        api_key: API_KEY.to_string(),
        image_timeout,
    };
    HttpCatApi::with_client(client, &config).unwrap()
}

#[tokio::test]
async fn test_fetch_page_sends_query_and_key() {
    let body = br#"[
        {"id":"a1","url":"https://cdn2.thecatapi.com/images/a1.jpg","width":500,"height":400},
        {"id":"a2","url":"https://cdn2.thecatapi.com/images/a2.jpg","width":300,"height":200}
    ]"#;
    let (base, server) = serve_once("200 OK", body).await;

    let records = api(&base, Duration::from_secs(5))
        .fetch_page(2, 5)
        .await
        .unwrap();
    let head = server.await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].id, "a2");
    assert!(
        head.starts_with("GET /v1/images/search?page=2&limit=5&order=Asc HTTP/1.1\r\n"),
        "unexpected request: {}",
        head
    );
    assert!(head
        .to_ascii_lowercase()
        .contains(&format!("x-api-key: {}\r\n", API_KEY)));
}

#[tokio::test]
async fn test_fetch_page_error_object_is_decoding_error() {
    let body = br#"{"message":"Invalid API key","status":401,"level":"info"}"#;
    let (base, server) = serve_once("401 Unauthorized", body).await;

    let result = api(&base, Duration::from_secs(5)).fetch_page(0, 10).await;
    server.await.unwrap();

    assert!(matches!(result, Err(FetchError::Decoding { status: 401, .. })));
}

#[tokio::test]
async fn test_fetch_page_garbage_is_parsing_error() {
    let (base, server) = serve_once("200 OK", b"<html>nope</html>").await;

    let result = api(&base, Duration::from_secs(5)).fetch_page(0, 10).await;
    server.await.unwrap();

    assert!(matches!(result, Err(FetchError::Parsing)));
}

#[tokio::test]
async fn test_fetch_image_returns_bytes() {
    let (base, server) = serve_once("200 OK", b"\x89PNG fake").await;
    let url = encode_image_url(&format!("{}/images/a1.png", base)).unwrap();

    let bytes = api(&base, Duration::from_secs(5)).fetch_image(&url).await.unwrap();
    let head = server.await.unwrap();

    assert_eq!(&bytes[..], b"\x89PNG fake");
    assert!(head.starts_with("GET /images/a1.png HTTP/1.1\r\n"));
}

#[tokio::test]
async fn test_fetch_image_http_error() {
    let (base, server) = serve_once("404 Not Found", b"").await;
    let url = encode_image_url(&format!("{}/images/missing.png", base)).unwrap();

    let result = api(&base, Duration::from_secs(5)).fetch_image(&url).await;
    server.await.unwrap();

    assert!(matches!(result, Err(FetchError::Error(_))));
}

#[tokio::test]
async fn test_fetch_image_timeout() {
    let (base, server) =
        serve_once_after("200 OK", b"late", Duration::from_millis(500)).await;
    let url = encode_image_url(&format!("{}/images/slow.png", base)).unwrap();

    let result = api(&base, Duration::from_millis(50)).fetch_image(&url).await;
    server.await.unwrap();

    assert!(matches!(result, Err(FetchError::Timeout)));
}
