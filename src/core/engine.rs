//! Request engine
//!
//! Executes one logical `send` over possibly-many physical attempts (one
//! per redirect hop). The engine prepares the wire request from the
//! caller's descriptor — multipart encoding, header negotiation — hands it
//! to the transport driver, runs the body decoder over the completed
//! response, consults the redirect resolver, and classifies the terminal
//! outcome. The caller's descriptor is never mutated; every hop works on
//! the engine's own copy.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::decoder::decode_body;
use crate::core::drivers::{Driver, SocketDriver, WireRequest};
use crate::core::multipart;
use crate::core::redirect;
use crate::core::request::{Method, RequestDescriptor};
use crate::core::response::{BodyStream, Outcome, RawResponse, ResponseResult};
use crate::utils::error::{Error, Result};

/// Engine policy knobs, with the documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Redirect hop cap; exceeding it fails with
    /// [`Error::TooManyRedirects`].
    pub max_redirects: u32,

    /// Force `accept-encoding: gzip, deflate` on non-HEAD requests when the
    /// caller did not set the header themselves.
    pub force_accept_encoding: bool,

    /// Re-attach the current query string when a relative redirect target
    /// has none of its own.
    pub preserve_query_on_redirect: bool,

    /// Wall-clock budget for the whole `send`, including every redirect
    /// hop; `None` disables the limit.
    pub total_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_redirects: 10,
            force_accept_encoding: true,
            preserve_query_on_redirect: false,
            total_timeout: None,
        }
    }
}

/// Executes requests through a pluggable transport driver.
///
/// A single `send` is self-contained; concurrent sends on one engine share
/// nothing but the driver, which holds no per-request state.
#[derive(Debug)]
pub struct RequestEngine<D = SocketDriver> {
    driver: D,
    config: EngineConfig,
}

impl Default for RequestEngine<SocketDriver> {
    fn default() -> Self {
        Self::with_driver(SocketDriver::default(), EngineConfig::default())
    }
}

impl RequestEngine<SocketDriver> {
    /// An engine over the self-contained socket driver.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_driver(SocketDriver::default(), config)
    }
}

impl<D: Driver> RequestEngine<D> {
    /// An engine over an explicitly supplied transport driver.
    pub fn with_driver(driver: D, config: EngineConfig) -> Self {
        Self { driver, config }
    }

    /// The transport driver in use.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Execute the request to its terminal outcome.
    ///
    /// Returns the decoded response for statuses in `200..300`; any other
    /// terminal status surfaces as [`Error::Http`] carrying the same fully
    /// decoded response. Transport, decompression and redirect-cap failures
    /// map to their own variants. Dropping the returned future aborts the
    /// underlying connection.
    pub async fn send(&self, descriptor: &RequestDescriptor) -> Result<ResponseResult> {
        self.with_timeout(self.drive(descriptor)).await
    }

    /// Execute the request but hand back the terminal raw response —
    /// status, headers and the still-streaming body — without decoding or
    /// outcome classification. Redirect hops are followed (their bodies
    /// drained) exactly as in [`send`](Self::send).
    pub async fn send_passthrough(&self, descriptor: &RequestDescriptor) -> Result<RawResponse> {
        self.with_timeout(self.drive_passthrough(descriptor)).await
    }

    async fn drive(&self, descriptor: &RequestDescriptor) -> Result<ResponseResult> {
        let mut attempt = self.prepare(descriptor);
        let mut hops = 0u32;

        loop {
            debug!(
                method = %attempt.method,
                url = %attempt.url,
                driver = self.driver.name(),
                hops,
                "sending request"
            );
            let raw = self.driver.execute(&attempt).await?;
            let status = raw.status;
            let status_text = raw.status_text;
            let headers = raw.headers;
            let body = collect(raw.body).await?;
            let decoded = decode_body(
                status,
                &headers,
                body,
                descriptor.auto_string,
                descriptor.json,
            )?;

            if descriptor.follow_redirects {
                if let Some(hop) = redirect::resolve(
                    attempt.method,
                    &attempt.url,
                    status,
                    &headers,
                    self.config.preserve_query_on_redirect,
                )? {
                    hops += 1;
                    if hops > self.config.max_redirects {
                        return Err(Error::TooManyRedirects { hops });
                    }
                    debug!(status, target = %hop.url, "following redirect");
                    self.apply_hop(&mut attempt, hop);
                    continue;
                }
            }

            let outcome = if (200..300).contains(&status) {
                Outcome::Success
            } else {
                Outcome::HttpError
            };
            let result = ResponseResult {
                status,
                status_text,
                headers,
                raw_body: decoded.raw,
                text: decoded.text,
                body: decoded.body,
                outcome,
            };
            return if result.is_success() {
                Ok(result)
            } else {
                Err(Error::Http {
                    response: Box::new(result),
                })
            };
        }
    }

    async fn drive_passthrough(&self, descriptor: &RequestDescriptor) -> Result<RawResponse> {
        let mut attempt = self.prepare(descriptor);
        let mut hops = 0u32;

        loop {
            debug!(
                method = %attempt.method,
                url = %attempt.url,
                driver = self.driver.name(),
                hops,
                "sending passthrough request"
            );
            let raw = self.driver.execute(&attempt).await?;

            if descriptor.follow_redirects {
                if let Some(hop) = redirect::resolve(
                    attempt.method,
                    &attempt.url,
                    raw.status,
                    &raw.headers,
                    self.config.preserve_query_on_redirect,
                )? {
                    hops += 1;
                    if hops > self.config.max_redirects {
                        return Err(Error::TooManyRedirects { hops });
                    }
                    // the hop's body has to be consumed before reconnecting
                    drain(raw.body).await?;
                    debug!(status = raw.status, target = %hop.url, "following redirect");
                    self.apply_hop(&mut attempt, hop);
                    continue;
                }
            }

            return Ok(raw);
        }
    }

    /// Build the first attempt's wire request from the descriptor.
    fn prepare(&self, descriptor: &RequestDescriptor) -> WireRequest {
        let mut headers = descriptor.headers.clone();
        let body = if descriptor.files.is_empty() {
            if descriptor.json && !headers.contains("content-type") {
                headers.insert("content-type", "application/json");
            }
            descriptor.body.clone()
        } else {
            // attachments force multipart, overriding any raw payload
            let multipart = multipart::encode(&descriptor.files);
            headers.insert("content-type", multipart.content_type());
            Some(multipart.into_bytes())
        };

        if self.config.force_accept_encoding
            && descriptor.method != Method::Head
            && !headers.contains("accept-encoding")
        {
            headers.insert("accept-encoding", "gzip, deflate");
        }
        if !headers.contains("user-agent") {
            headers.insert(
                "user-agent",
                format!("nekocurl v{} ({})", crate::VERSION, self.driver.name()),
            );
        }

        WireRequest {
            url: descriptor.url.clone(),
            method: descriptor.method,
            headers,
            body,
        }
    }

    /// Rewrite the working attempt for the next redirect hop.
    fn apply_hop(&self, attempt: &mut WireRequest, hop: redirect::NextHop) {
        attempt.url = hop.url;
        attempt.method = hop.method;
        if !hop.keep_body {
            attempt.body = None;
            attempt.headers.remove("content-type");
            attempt.headers.remove("content-length");
        }
        // a hop can rewrite HEAD to GET, making the encoding policy apply
        if self.config.force_accept_encoding
            && attempt.method != Method::Head
            && !attempt.headers.contains("accept-encoding")
        {
            attempt.headers.insert("accept-encoding", "gzip, deflate");
        }
    }

    async fn with_timeout<T>(
        &self,
        operation: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match self.config.total_timeout {
            Some(after) => tokio::time::timeout(after, operation)
                .await
                .map_err(|_| Error::Timeout { after })?,
            None => operation.await,
        }
    }
}

/// Accumulate a body stream into one buffer.
async fn collect(mut stream: BodyStream) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf.freeze())
}

/// Consume a body stream, discarding the chunks but surfacing errors.
async fn drain(mut stream: BodyStream) -> Result<()> {
    while let Some(chunk) = stream.next().await {
        chunk?;
    }
    Ok(())
}
