//! Response emission
//!
//! Cached or freshly fetched content becomes an HTTP response here, either as
//! a buffered body or as chunks pulled from a bounded channel.

use crate::cache::CacheContent;
use crate::repo::RequestMethod;
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::Response,
};
use futures::StreamExt;
use std::collections::HashMap;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Status and headers plus a body produced incrementally through a bounded channel
///
/// The producer pushes chunks and closes the channel by dropping its sender;
/// the response ends when the channel is closed and drained.
#[derive(Debug)]
pub struct StreamedContent {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    chunks: mpsc::Receiver<Bytes>,
}

impl StreamedContent {
    /// Open a channel with `capacity` slots
    pub fn channel(
        status_code: u16,
        headers: HashMap<String, String>,
        capacity: usize,
    ) -> (mpsc::Sender<Bytes>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            tx,
            Self {
                status_code,
                headers,
                chunks: rx,
            },
        )
    }

    /// Drain every chunk into one buffer
    pub async fn collect(mut self) -> Bytes {
        let mut body = Vec::new();
        while let Some(chunk) = self.chunks.recv().await {
            body.extend_from_slice(&chunk);
        }
        Bytes::from(body)
    }
}

/// Emit metadata; HEAD responses carry status and headers only
pub fn emit_content(method: RequestMethod, content: CacheContent) -> Response {
    let (status, headers, body) = content.into_parts();

    let body = if method.is_head() {
        Body::empty()
    } else {
        Body::from(body)
    };

    let mut response = Response::new(body);
    *response.status_mut() = status_code(status);
    apply_headers(response.headers_mut(), &headers, !method.is_head());
    response
}

/// Emit a channel-backed body, forwarding chunks in order until the channel closes
pub fn emit_stream(content: StreamedContent) -> Response {
    let stream = ReceiverStream::new(content.chunks).map(Ok::<_, Infallible>);

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status_code(content.status_code);
    apply_headers(response.headers_mut(), &content.headers, true);
    response
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or_else(|_| {
        tracing::warn!(status, "Invalid cached status code");
        StatusCode::BAD_GATEWAY
    })
}

/// Copy cached headers onto a response
///
/// With a body, the length is recomputed from the bytes actually sent.
fn apply_headers(target: &mut HeaderMap, headers: &HashMap<String, String>, has_body: bool) {
    for (name, value) in headers {
        let parsed = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        );
        match parsed {
            (Ok(name), Ok(value)) => {
                if has_body && name == header::CONTENT_LENGTH {
                    continue;
                }
                target.insert(name, value);
            }
            _ => {
                tracing::warn!(header = %name, "Skipping invalid cached header");
            }
        }
    }
}
