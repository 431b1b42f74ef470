//! HTTP client used for replay and upstream forwarding

use std::time::Duration;

use bytes::Bytes;
use http::header::HOST;
use http::{StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tracing::{debug, warn};

use crate::{GophermanError, Result};

/// HTTP client for issuing live requests
#[derive(Clone)]
pub struct HttpClient {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpClient {
    /// Create a new HTTP client
    #[must_use]
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .build_http();

        Self { client }
    }

    /// Send a request and drain the response body
    ///
    /// # Errors
    ///
    /// Returns `Transport` error if the request cannot be sent or the
    /// response body cannot be read
    pub async fn send(&self, request: http::Request<Full<Bytes>>) -> Result<ClientResponse> {
        debug!("Sending {} {}", request.method(), request.uri());

        let response = self.client.request(request).await.map_err(|e| {
            warn!("Request failed: {e}");
            GophermanError::Transport(format!("Request failed: {e}"))
        })?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| GophermanError::Transport(format!("Failed to read response body: {e}")))?
            .to_bytes();

        Ok(ClientResponse { status, body })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Response to a sent request
#[derive(Debug, Clone)]
pub struct ClientResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body
    pub body: Bytes,
}

/// Point a request at `authority` over plain HTTP, keeping its path and
/// query. The Host header is dropped so it follows the new authority.
///
/// # Errors
///
/// Returns `InvalidRequest` error if `authority` is not a valid authority
pub fn with_authority<B>(request: http::Request<B>, authority: &str) -> Result<http::Request<B>> {
    let (mut parts, body) = request.into_parts();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map_or_else(|| "/".to_string(), ToString::to_string);

    parts.uri = Uri::builder()
        .scheme("http")
        .authority(authority)
        .path_and_query(path_and_query)
        .build()
        .map_err(|e| GophermanError::InvalidRequest(format!("Invalid target '{authority}': {e}")))?;
    parts.headers.remove(HOST);

    Ok(http::Request::from_parts(parts, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_authority_rewrites_target() {
        let request = http::Request::builder()
            .uri("https://api.example.com:8443/users?page=2")
            .header("host", "api.example.com:8443")
            .header("accept", "application/json")
            .body(())
            .unwrap();

        let request = with_authority(request, "localhost:3002").unwrap();
        assert_eq!(request.uri().to_string(), "http://localhost:3002/users?page=2");
        assert!(request.headers().get(HOST).is_none());
        assert_eq!(request.headers()["accept"], "application/json");
    }

    #[test]
    fn test_with_authority_origin_form() {
        let request = http::Request::builder().uri("/health").body(()).unwrap();
        let request = with_authority(request, "127.0.0.1:9000").unwrap();
        assert_eq!(request.uri().to_string(), "http://127.0.0.1:9000/health");
    }

    #[test]
    fn test_with_authority_rejects_invalid() {
        let request = http::Request::builder().uri("/health").body(()).unwrap();
        let result = with_authority(request, "bad host:port");
        assert!(matches!(result, Err(GophermanError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_send_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::new();
        let request = http::Request::builder()
            .uri(format!("http://{addr}/"))
            .body(Full::new(Bytes::new()))
            .unwrap();

        let result = client.send(request).await;
        assert!(matches!(result, Err(GophermanError::Transport(_))));
    }
}
