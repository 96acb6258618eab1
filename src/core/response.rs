//! Response model
//!
//! Drivers produce a [`RawResponse`] — status, headers and a streaming body.
//! The engine consumes the stream, runs the body decoder and hands the
//! caller a [`ResponseResult`] with both the raw bytes and the decoded view.

use std::fmt;

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::BoxStream;

use crate::core::headers::Headers;
use crate::utils::error::Result;

/// Streaming response body: chunks in arrival order, then end-of-stream.
pub type BodyStream = BoxStream<'static, Result<Bytes>>;

/// Classification of a terminal response by status range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Status in `200..300`
    Success,
    /// Any other status
    HttpError,
}

/// The decoded view of a response body.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedBody {
    /// Raw bytes (`auto_string` disabled and no recognized content type)
    Bytes(Bytes),
    /// UTF-8 text
    Text(String),
    /// Parsed `application/json` payload
    Json(serde_json::Value),
    /// Parsed `application/x-www-form-urlencoded` payload, pairs in order
    Form(Vec<(String, String)>),
}

impl DecodedBody {
    /// The text form, if this body decoded as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DecodedBody::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The JSON value, if this body decoded as JSON.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            DecodedBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The form pairs, if this body decoded as a form.
    pub fn as_form(&self) -> Option<&[(String, String)]> {
        match self {
            DecodedBody::Form(pairs) => Some(pairs),
            _ => None,
        }
    }
}

/// The normalized result of one completed (non-redirected) request.
#[derive(Debug, Clone)]
pub struct ResponseResult {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase from the status line (canonical phrase when the server
    /// sent none)
    pub status_text: String,
    /// Response headers, names lowercased, duplicates comma-joined
    pub headers: Headers,
    /// Body bytes after any decompression
    pub raw_body: Bytes,
    /// UTF-8 projection of `raw_body`
    pub text: String,
    /// Content-type-sniffed view of the body
    pub body: DecodedBody,
    /// Success / HTTP-error classification
    pub outcome: Outcome,
}

impl ResponseResult {
    /// Whether the status is in `200..300`.
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// A driver-level response: head fields plus the still-streaming body.
///
/// Status and headers are available before the body has been consumed,
/// which is what passthrough callers need.
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase
    pub status_text: String,
    /// Response headers, names lowercased
    pub headers: Headers,
    /// Body chunks in arrival order
    pub body: BodyStream,
}

impl RawResponse {
    /// Drain the body stream into a single buffer.
    pub async fn bytes(mut self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Canonical reason phrase for common status codes, used when the server
/// omits one from the status line.
pub(crate) fn canonical_reason(status: u16) -> &'static str {
    match status {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        413 => "Payload Too Large",
        415 => "Unsupported Media Type",
        418 => "I'm a teapot",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}
