//! Recording interceptor
//!
//! Wraps a [`Handler`], records every exchange that passes through it and
//! exposes two control paths: [`RESET_PATH`] clears the current session and
//! [`TERMINATE_PATH`] persists it as a collection.

use std::path::PathBuf;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use http_body_util::Full;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::model::{self, Auth, Collection, Item};
use crate::storage;
use crate::Result;

use super::capture::CaptureWriter;
use super::handler::Handler;
use super::session::{session_name, Session, SessionState};

/// Control path that persists the current session
pub const TERMINATE_PATH: &str = "/gopherman-terminate";

/// Control path that clears the current session
pub const RESET_PATH: &str = "/gopherman-reset";

const NOT_STARTED: &str = "recorder is not started";

/// Middleware that records traffic to a wrapped handler
pub struct Recorder<H> {
    handler: H,
    session: Mutex<Session>,
    session_dir: PathBuf,
    auth: Option<Auth>,
}

impl<H: Handler> Recorder<H> {
    /// Create a recorder persisting sessions into `session_dir`
    #[must_use]
    pub fn new(handler: H, session_dir: PathBuf) -> Self {
        Self {
            handler,
            session: Mutex::new(Session::new()),
            session_dir,
            auth: None,
        }
    }

    /// Create a recorder persisting into `<home>/.op/gopherman`
    ///
    /// # Errors
    ///
    /// Returns error if the home directory cannot be determined
    pub fn with_default_dir(handler: H) -> Result<Self> {
        Ok(Self::new(handler, storage::default_session_dir()?))
    }

    /// Attach an auth descriptor to every persisted collection
    #[must_use]
    pub fn with_auth(mut self, auth: Option<Auth>) -> Self {
        self.auth = auth;
        self
    }

    /// Directory sessions are persisted into
    #[must_use]
    pub fn session_dir(&self) -> &std::path::Path {
        &self.session_dir
    }

    /// Current session state
    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    /// Items recorded in the current session
    pub async fn recorded_items(&self) -> Vec<Item> {
        self.session.lock().await.items().to_vec()
    }

    /// Route one inbound request
    ///
    /// A traffic request belongs to the session active when it arrived. If
    /// a reset or terminate completes while the wrapped handler is still
    /// running, the response is passed through but the exchange is not
    /// recorded.
    pub async fn handle<B>(&self, request: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: hyper::body::Body,
        B::Error: std::fmt::Display,
    {
        match request.uri().path() {
            TERMINATE_PATH => self.handle_terminate().await,
            RESET_PATH => self.handle_reset().await,
            _ => self.record(request).await,
        }
    }

    async fn handle_terminate(&self) -> http::Response<Full<Bytes>> {
        let mut session = self.session.lock().await;
        let Some(started_at) = session.started_at() else {
            warn!("Terminate requested but recorder is not started");
            return text_response(StatusCode::METHOD_NOT_ALLOWED, NOT_STARTED);
        };

        info!("Recorder terminating ({} items)", session.len());

        let collection = Collection::new(
            &session_name(started_at),
            session.items().to_vec(),
            self.auth.clone(),
        );

        let json = match collection.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to encode collection: {e}");
                return text_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("failed to encode collection: {e}"),
                );
            }
        };

        // Buffer stays intact on failure so terminate can be retried
        let path = match storage::write_session(&self.session_dir, started_at, &json).await {
            Ok(path) => path,
            Err(e) => {
                error!("Failed to write collection: {e}");
                return text_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("failed to write collection: {e}"),
                );
            }
        };

        session.finish();
        info!("Recorder wrote collection to {}", path.display());

        let mut response = response(StatusCode::OK, Bytes::from(json));
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }

    async fn handle_reset(&self) -> http::Response<Full<Bytes>> {
        let mut session = self.session.lock().await;
        if !session.reset() {
            warn!("Reset requested but recorder is not started");
            return text_response(StatusCode::METHOD_NOT_ALLOWED, NOT_STARTED);
        }

        info!("Recorder reset");
        response(StatusCode::OK, Bytes::new())
    }

    async fn record<B>(&self, request: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: hyper::body::Body,
        B::Error: std::fmt::Display,
    {
        let started_at = {
            let mut session = self.session.lock().await;
            if session.start_if_idle() {
                info!("Recording session started");
            }
            session.started_at()
        };

        let request_uri = request
            .uri()
            .path_and_query()
            .map_or_else(|| "/".to_string(), ToString::to_string);

        let (canonical, live) = match model::Request::from_live(request).await {
            Ok(converted) => converted,
            Err(e) => {
                warn!("Failed to convert {request_uri}: {e}");
                return text_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("failed to convert request: {e}"),
                );
            }
        };

        let mut capture = CaptureWriter::new(live.headers().clone());
        self.handler.serve(&live, &mut capture).await;
        let (status, body) = capture.into_parts();

        let recorded = (!body.is_empty()).then(|| model::Response::raw(&body, status.as_u16()));
        let item = Item::recorded(&request_uri, canonical, recorded);

        {
            let mut session = self.session.lock().await;
            let kept = started_at.is_some_and(|at| session.push_if_current(at, item));
            if kept {
                debug!("Request recorded: {} {request_uri} ({} in session)", live.method(), session.len());
            } else {
                warn!("Session changed while {} {request_uri} was in flight, not recorded", live.method());
            }
        }

        response(status, Bytes::from(body))
    }
}

fn response(status: StatusCode, body: Bytes) -> http::Response<Full<Bytes>> {
    let mut response = http::Response::new(Full::new(body));
    *response.status_mut() = status;
    response
}

fn text_response(status: StatusCode, message: &str) -> http::Response<Full<Bytes>> {
    let mut response = response(status, Bytes::from(message.to_string()));
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
