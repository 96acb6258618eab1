//! Transport drivers
//!
//! A driver performs the physical network I/O for one prepared request and
//! hands back the raw response. The engine owns everything around the
//! exchange — header negotiation, multipart encoding, decompression,
//! redirects, outcome classification — so drivers stay interchangeable.
//!
//! Drivers are supplied to the engine by explicit construction; there is no
//! process-wide driver registry.

use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::core::headers::Headers;
use crate::core::request::Method;
use crate::core::response::RawResponse;
use crate::utils::error::Result;

pub mod reqwest;
pub mod socket;

pub use self::reqwest::ReqwestDriver;
pub use socket::{SocketDriver, SocketDriverConfig};

/// One fully-prepared physical request: the engine's per-attempt state
/// after multipart encoding and header negotiation.
#[derive(Debug, Clone)]
pub struct WireRequest {
    /// Absolute target URL
    pub url: Url,
    /// Request method
    pub method: Method,
    /// Final request headers, names lowercased
    pub headers: Headers,
    /// Payload to send, if any
    pub body: Option<Bytes>,
}

/// A pluggable transport that executes one request/response exchange.
#[async_trait]
pub trait Driver: Send + Sync + Debug {
    /// Short identifier used in the default user-agent and in logs.
    fn name(&self) -> &'static str;

    /// Perform the exchange and return the response head plus streaming
    /// body. Implementations must not follow redirects or decompress the
    /// body — both belong to the engine.
    async fn execute(&self, request: &WireRequest) -> Result<RawResponse>;
}
