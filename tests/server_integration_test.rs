//! Server integration tests that test the actual server behavior.
//!
//! These tests start a real TCP server and talk to it over HTTP, with a
//! wiremock server standing in for the image host.

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;

use common::app::test_config;
use common::fixtures::cutout_module;
use common::MockImageServer;
use modstrip::server::{build_router, create_app_state};

/// Start a test server on an available port and return the port number.
async fn start_test_server() -> u16 {
    let state = create_app_state(test_config()).expect("Failed to create app state");
    let app = build_router(state);

    // Bind to port 0 to get an available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let port = listener.local_addr().unwrap().port();

    // Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    port
}

#[tokio::test]
async fn test_health_over_tcp() {
    let port = start_test_server().await;

    let response = reqwest::get(format!("http://127.0.0.1:{port}/health"))
        .await
        .expect("Request failed");
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_render_over_tcp() {
    let images = MockImageServer::start().await;
    images.mock_png("/m.png", cutout_module()).await;
    let port = start_test_server().await;

    let url = images.url_for("/m.png");
    let response = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}/render"))
        .header("content-type", "application/json")
        .body(
            json!({
                "urls": [url, url],
                "options": {"trim": {"mode": "alpha"}, "padding": 0}
            })
            .to_string(),
        )
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status().as_u16(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    let width = response
        .headers()
        .get("x-image-width")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_eq!(width.as_deref(), Some("160"));

    let body = response.bytes().await.unwrap();
    assert_eq!(&body[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let images = MockImageServer::start().await;
    images.mock_png("/m.png", cutout_module()).await;
    let port = start_test_server().await;
    let client = reqwest::Client::new();
    let url = images.url_for("/m.png");

    let requests = (1..=4).map(|n| {
        let client = client.clone();
        let urls = vec![url.clone(); n];
        async move {
            let response = client
                .post(format!("http://127.0.0.1:{port}/render"))
                .header("content-type", "application/json")
                .body(
                    json!({"urls": urls, "options": {"trim": {"mode": "alpha"}, "padding": 0}})
                        .to_string(),
                )
                .send()
                .await
                .expect("Request failed");
            response
                .headers()
                .get("x-image-width")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u32>().ok())
        }
    });

    let widths = futures_util::future::join_all(requests).await;
    assert_eq!(widths, vec![Some(80), Some(160), Some(240), Some(320)]);
}
