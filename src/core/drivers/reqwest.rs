//! reqwest-backed transport driver
//!
//! A thin adapter that lets the engine run over the `reqwest` client
//! instead of the self-contained socket driver. Redirect following is
//! disabled on the client — the engine owns redirect semantics — and the
//! client is built without automatic decompression so the body decoder
//! sees exactly what the server sent.

use async_trait::async_trait;
use futures::StreamExt;
use tracing::warn;

use crate::core::drivers::{Driver, WireRequest};
use crate::core::headers::Headers;
use crate::core::request::Method;
use crate::core::response::RawResponse;
use crate::utils::error::{Error, Result};

/// Transport driver backed by a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestDriver {
    client: reqwest::Client,
}

impl ReqwestDriver {
    /// Build a driver with a client configured for engine use (no redirect
    /// following). Falls back to the default client if the builder fails.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|e| {
                warn!("failed to build configured reqwest client, falling back to default: {e}");
                reqwest::Client::new()
            });
        Self { client }
    }

    /// Wrap an existing client. The caller is responsible for disabling
    /// redirect following on it.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Driver for ReqwestDriver {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    async fn execute(&self, request: &WireRequest) -> Result<RawResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, request.url.clone());
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::transport(format!("reqwest: {e}")))?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("")
            .to_string();
        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            headers.add(name.as_str(), value.to_str().unwrap_or_default());
        }
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| Error::transport(format!("reqwest body: {e}"))))
            .boxed();

        Ok(RawResponse {
            status,
            status_text,
            headers,
            body,
        })
    }
}
