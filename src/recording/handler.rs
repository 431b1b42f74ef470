//! Downstream handler abstraction wrapped by the recorder

use bytes::Bytes;
use futures_util::future::BoxFuture;

use super::capture::ResponseWriter;

/// An HTTP handler that writes its response into a [`ResponseWriter`]
pub trait Handler: Send + Sync + 'static {
    /// Serve one request
    fn serve<'a>(
        &'a self,
        request: &'a http::Request<Bytes>,
        writer: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, ()>;
}

/// Handler backed by a synchronous closure
pub struct HandlerFn<F> {
    f: F,
}

/// Wrap a closure as a [`Handler`]
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&http::Request<Bytes>, &mut dyn ResponseWriter) + Send + Sync + 'static,
{
    HandlerFn { f }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&http::Request<Bytes>, &mut dyn ResponseWriter) + Send + Sync + 'static,
{
    fn serve<'a>(
        &'a self,
        request: &'a http::Request<Bytes>,
        writer: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, ()> {
        (self.f)(request, writer);
        Box::pin(std::future::ready(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::CaptureWriter;
    use http::StatusCode;

    #[tokio::test]
    async fn test_handler_fn_writes_into_capture() {
        let handler = handler_fn(|request, writer| {
            writer.set_status(StatusCode::ACCEPTED);
            writer.write_body(request.uri().path().as_bytes());
        });

        let request = http::Request::builder()
            .uri("/echo")
            .body(Bytes::new())
            .unwrap();
        let mut capture = CaptureWriter::new(request.headers().clone());

        handler.serve(&request, &mut capture).await;

        assert_eq!(capture.status(), StatusCode::ACCEPTED);
        assert_eq!(capture.body(), b"/echo");
    }
}
