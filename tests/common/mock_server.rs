//! Mock image host for fetch tests.

use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Wrapper around wiremock MockServer with convenience methods
pub struct MockImageServer {
    pub server: MockServer,
}

impl MockImageServer {
    /// Start a new mock HTTP server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get URL for a specific path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    /// Serve a PNG at `endpoint`
    pub async fn mock_png(&self, endpoint: &str, png: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(png)
                    .insert_header("content-type", "image/png"),
            )
            .mount(&self.server)
            .await;
    }

    /// Serve arbitrary bytes with the given content type
    pub async fn mock_bytes(&self, endpoint: &str, content_type: &str, body: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(body)
                    .insert_header("content-type", content_type),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock an endpoint that returns an error, expecting exactly `times` hits
    pub async fn mock_error(&self, endpoint: &str, status: u16, times: u64) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Number of requests the server has seen for `endpoint`
    pub async fn hits(&self, endpoint: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == endpoint)
            .count()
    }
}
