//! TCP accept loop serving a [`Recorder`] over HTTP/1

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::Limited;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::config::LimitsConfig;
use crate::recording::{Handler, Recorder};
use crate::Result;

/// HTTP server with the recorder mounted in front of its handler
pub struct RecordingServer<H> {
    listener: TcpListener,
    recorder: Arc<Recorder<H>>,
    connections: Arc<Semaphore>,
    max_body_size: usize,
}

impl<H: Handler> RecordingServer<H> {
    /// Bind the server
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be bound
    pub async fn bind(addr: SocketAddr, recorder: Recorder<H>, limits: &LimitsConfig) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;

        Ok(Self {
            listener,
            recorder: Arc::new(recorder),
            connections: Arc::new(Semaphore::new(limits.max_connections)),
            max_body_size: limits.max_body_size,
        })
    }

    /// Address the server is listening on
    ///
    /// # Errors
    ///
    /// Returns error if the socket address cannot be read
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared handle to the mounted recorder
    #[must_use]
    pub fn recorder(&self) -> Arc<Recorder<H>> {
        Arc::clone(&self.recorder)
    }

    /// Serve until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns error if the server fails
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
            info!("Received SIGINT, shutting down");
        })
        .await
    }

    /// Serve until `shutdown` completes
    ///
    /// # Errors
    ///
    /// Returns error if the server fails
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!("Recorder listening on {}", self.local_addr()?);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => self.spawn_connection(stream, peer_addr),
                        Err(e) => error!("Accept error: {e}"),
                    }
                }
                () = &mut shutdown => {
                    info!("Recorder shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    fn spawn_connection(&self, stream: tokio::net::TcpStream, peer_addr: SocketAddr) {
        let Ok(permit) = Arc::clone(&self.connections).try_acquire_owned() else {
            warn!("Connection limit reached, rejecting {peer_addr}");
            return;
        };

        let recorder = Arc::clone(&self.recorder);
        let max_body_size = self.max_body_size;

        tokio::spawn(async move {
            let _permit = permit;

            let service = service_fn(move |request: http::Request<Incoming>| {
                let recorder = Arc::clone(&recorder);
                async move {
                    let request = request.map(|body| Limited::new(body, max_body_size));
                    Ok::<_, Infallible>(recorder.handle(request).await)
                }
            });

            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                debug!("Connection error from {peer_addr}: {e}");
            }
        });
    }
}
