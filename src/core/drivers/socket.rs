//! Self-contained HTTP/1.1 transport over raw sockets
//!
//! The from-scratch driver: resolves the host, opens a TCP connection
//! (wrapped in rustls for https), writes the request line, headers and
//! body, parses the response head and streams the body according to its
//! framing — `transfer-encoding: chunked`, `content-length`, or
//! read-to-end-of-stream. Connections are one-shot (`connection: close`);
//! there is no pooling.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tracing::debug;

use crate::core::drivers::{Driver, WireRequest};
use crate::core::headers::Headers;
use crate::core::request::Method;
use crate::core::response::{BodyStream, RawResponse, canonical_reason};
use crate::utils::error::{Error, Result};

/// Configuration for the socket driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketDriverConfig {
    /// Time allowed for DNS + TCP connect (and TLS handshake); `None`
    /// disables the limit.
    pub connect_timeout: Option<Duration>,
}

impl Default for SocketDriverConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(10)),
        }
    }
}

/// The from-scratch HTTP/1.1 driver.
pub struct SocketDriver {
    config: SocketDriverConfig,
    tls: TlsConnector,
}

impl SocketDriver {
    /// Create a driver with the given configuration. The TLS client config
    /// (webpki roots, no client auth) is built once and shared.
    pub fn new(config: SocketDriverConfig) -> Self {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let tls_config = ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        Self {
            config,
            tls: TlsConnector::from(Arc::new(tls_config)),
        }
    }

    /// The driver configuration.
    pub fn config(&self) -> &SocketDriverConfig {
        &self.config
    }

    async fn connect(&self, scheme: &str, host: &str, port: u16) -> Result<Box<dyn Transport>> {
        let connect = TcpStream::connect((host, port));
        let tcp = match self.config.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .map_err(|_| Error::transport(format!("connect to {host}:{port} timed out")))??,
            None => connect.await?,
        };
        let _ = tcp.set_nodelay(true);

        if scheme == "https" {
            let name = ServerName::try_from(host.to_string())
                .map_err(|e| Error::transport(format!("invalid server name {host:?}: {e}")))?;
            let tls = self
                .tls
                .connect(name, tcp)
                .await
                .map_err(|e| Error::transport(format!("TLS handshake with {host} failed: {e}")))?;
            Ok(Box::new(tls))
        } else {
            Ok(Box::new(tcp))
        }
    }
}

impl Default for SocketDriver {
    fn default() -> Self {
        Self::new(SocketDriverConfig::default())
    }
}

impl fmt::Debug for SocketDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketDriver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Driver for SocketDriver {
    fn name(&self) -> &'static str {
        "socket"
    }

    async fn execute(&self, request: &WireRequest) -> Result<RawResponse> {
        let url = &request.url;
        let host = url
            .host_str()
            .ok_or_else(|| Error::invalid("URL has no host"))?;
        let port = url.port_or_known_default().unwrap_or(80);

        debug!(method = %request.method, %url, "opening connection");
        let stream = self.connect(url.scheme(), host, port).await?;
        let mut stream = BufReader::new(stream);

        write_request(&mut stream, request).await?;
        let head = read_head(&mut stream).await?;
        debug!(status = head.status, "response head received");

        let status_text = if head.reason.is_empty() {
            canonical_reason(head.status).to_string()
        } else {
            head.reason
        };
        let body = body_stream(stream, request.method, head.status, &head.headers);

        Ok(RawResponse {
            status: head.status,
            status_text,
            headers: head.headers,
            body,
        })
    }
}

/// Object-safe alias for the underlying connection, plain or TLS.
trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// Serialize and send the request line, headers and body.
async fn write_request<S>(stream: &mut S, request: &WireRequest) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let url = &request.url;
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    let mut head = format!("{} {} HTTP/1.1\r\n", request.method, target);
    if !request.headers.contains("host") {
        match url.port() {
            Some(port) => head.push_str(&format!("host: {}:{}\r\n", url.host_str().unwrap_or(""), port)),
            None => head.push_str(&format!("host: {}\r\n", url.host_str().unwrap_or(""))),
        }
    }
    for (name, value) in request.headers.iter() {
        head.push_str(name);
        head.push_str(": ");
        head.push_str(value);
        head.push_str("\r\n");
    }
    let needs_length = request.body.is_some()
        || matches!(request.method, Method::Post | Method::Put | Method::Patch);
    if needs_length && !request.headers.contains("content-length") {
        let length = request.body.as_ref().map(Bytes::len).unwrap_or(0);
        head.push_str(&format!("content-length: {length}\r\n"));
    }
    if !request.headers.contains("connection") {
        head.push_str("connection: close\r\n");
    }
    head.push_str("\r\n");

    stream.write_all(head.as_bytes()).await?;
    if let Some(body) = &request.body {
        stream.write_all(body).await?;
    }
    stream.flush().await?;
    Ok(())
}

/// Parsed response status line and headers.
#[derive(Debug)]
struct ResponseHead {
    status: u16,
    reason: String,
    headers: Headers,
}

/// Read and parse the status line and header block.
async fn read_head<S>(stream: &mut S) -> Result<ResponseHead>
where
    S: AsyncBufReadExt + Unpin,
{
    let status_line = read_line(stream).await.map_err(|_| {
        Error::transport("connection closed before a response head was received")
    })?;

    let mut parts = status_line.splitn(3, ' ');
    let version = parts.next().unwrap_or("");
    if !version.starts_with("HTTP/") {
        return Err(Error::transport(format!(
            "malformed status line {status_line:?}"
        )));
    }
    let status: u16 = parts
        .next()
        .unwrap_or("")
        .parse()
        .map_err(|_| Error::transport(format!("malformed status line {status_line:?}")))?;
    let reason = parts.next().unwrap_or("").trim().to_string();

    let mut headers = Headers::new();
    loop {
        let line = read_line(stream).await?;
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Error::transport(format!("malformed header line {line:?}")))?;
        headers.add(name.trim(), value.trim());
    }

    Ok(ResponseHead {
        status,
        reason,
        headers,
    })
}

/// Read one CRLF-terminated line, without the terminator. EOF before any
/// byte is a transport error.
async fn read_line<S>(stream: &mut S) -> Result<String>
where
    S: AsyncBufReadExt + Unpin,
{
    let mut line = String::new();
    let read = stream.read_line(&mut line).await?;
    if read == 0 {
        return Err(Error::transport("connection closed unexpectedly"));
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

/// Body framing for one response.
enum Framing {
    Empty,
    Chunked,
    Length(u64),
    Eof,
}

/// Stream the response body according to its framing.
fn body_stream<S>(stream: S, method: Method, status: u16, headers: &Headers) -> BodyStream
where
    S: AsyncBufReadExt + AsyncRead + Unpin + Send + 'static,
{
    let framing = if method == Method::Head || status == 204 || status == 304 {
        Framing::Empty
    } else if headers
        .get("transfer-encoding")
        .is_some_and(|value| value.to_ascii_lowercase().contains("chunked"))
    {
        Framing::Chunked
    } else if let Some(length) = headers
        .get("content-length")
        .and_then(|value| value.trim().parse::<u64>().ok())
    {
        Framing::Length(length)
    } else {
        Framing::Eof
    };

    match framing {
        Framing::Empty => futures::stream::empty().boxed(),
        Framing::Chunked => chunked_stream(stream).boxed(),
        Framing::Length(length) => length_stream(stream, length).boxed(),
        Framing::Eof => eof_stream(stream).boxed(),
    }
}

/// Decode `transfer-encoding: chunked` framing.
fn chunked_stream<S>(mut stream: S) -> impl futures::Stream<Item = Result<Bytes>>
where
    S: AsyncBufReadExt + AsyncRead + Unpin + Send + 'static,
{
    try_stream! {
        loop {
            let size_line = read_line(&mut stream).await?;
            let size_token = size_line.split(';').next().unwrap_or("").trim();
            let size = usize::from_str_radix(size_token, 16)
                .map_err(|_| Error::transport(format!("invalid chunk size {size_token:?}")))?;
            if size == 0 {
                // consume optional trailers up to the final empty line
                loop {
                    if read_line(&mut stream).await?.is_empty() {
                        break;
                    }
                }
                break;
            }
            let mut chunk = vec![0u8; size];
            stream.read_exact(&mut chunk).await.map_err(|_| {
                Error::transport("connection closed inside a chunk")
            })?;
            let mut crlf = [0u8; 2];
            stream.read_exact(&mut crlf).await.map_err(|_| {
                Error::transport("connection closed after a chunk")
            })?;
            yield Bytes::from(chunk);
        }
    }
}

/// Read exactly `length` bytes, in chunks.
fn length_stream<S>(mut stream: S, length: u64) -> impl futures::Stream<Item = Result<Bytes>>
where
    S: AsyncRead + Unpin + Send + 'static,
{
    try_stream! {
        let mut remaining = length;
        let mut buf = [0u8; 8192];
        while remaining > 0 {
            let want = remaining.min(buf.len() as u64) as usize;
            let read = stream.read(&mut buf[..want]).await?;
            if read == 0 {
                Err(Error::transport(
                    "connection closed before the declared content-length arrived",
                ))?;
            }
            remaining -= read as u64;
            yield Bytes::copy_from_slice(&buf[..read]);
        }
    }
}

/// Read until the peer closes the connection.
fn eof_stream<S>(mut stream: S) -> impl futures::Stream<Item = Result<Bytes>>
where
    S: AsyncRead + Unpin + Send + 'static,
{
    try_stream! {
        let mut buf = [0u8; 8192];
        loop {
            let read = stream.read(&mut buf).await?;
            if read == 0 {
                break;
            }
            yield Bytes::copy_from_slice(&buf[..read]);
        }
    }
}
