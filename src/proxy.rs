//! Forwarding handler for running the recorder as a reverse proxy

use bytes::Bytes;
use futures_util::future::BoxFuture;
use http::StatusCode;
use http_body_util::Full;
use tracing::{debug, warn};

use crate::network::{with_authority, HttpClient};
use crate::recording::{Handler, ResponseWriter};

/// Relays each request to an upstream service and writes back its status
/// and body
pub struct ForwardingHandler {
    client: HttpClient,
    upstream: String,
}

impl ForwardingHandler {
    /// Forward to `upstream` (`host:port`)
    #[must_use]
    pub fn new(upstream: impl Into<String>) -> Self {
        Self {
            client: HttpClient::new(),
            upstream: upstream.into(),
        }
    }

    /// Upstream authority
    #[must_use]
    pub fn upstream(&self) -> &str {
        &self.upstream
    }
}

impl Handler for ForwardingHandler {
    fn serve<'a>(
        &'a self,
        request: &'a http::Request<Bytes>,
        writer: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let mut builder = http::Request::builder()
                .method(request.method().clone())
                .uri(request.uri().clone());
            if let Some(headers) = builder.headers_mut() {
                headers.extend(request.headers().clone());
            }

            let forwarded = builder
                .body(Full::new(request.body().clone()))
                .map_err(|e| e.to_string())
                .and_then(|r| with_authority(r, &self.upstream).map_err(|e| e.to_string()));

            let result = match forwarded {
                Ok(forwarded) => self.client.send(forwarded).await.map_err(|e| e.to_string()),
                Err(e) => Err(e),
            };

            match result {
                Ok(response) => {
                    debug!(
                        "Upstream answered {} {} with {}",
                        request.method(),
                        request.uri(),
                        response.status
                    );
                    writer.set_status(response.status);
                    if !response.body.is_empty() {
                        writer.write_body(&response.body);
                    }
                }
                Err(e) => {
                    warn!("Upstream request to {} failed: {e}", self.upstream);
                    writer.set_status(StatusCode::BAD_GATEWAY);
                    writer.write_body(format!("upstream request failed: {e}").as_bytes());
                }
            }
        })
    }
}
