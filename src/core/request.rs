//! Request descriptor types
//!
//! A [`RequestDescriptor`] is the caller-assembled, immutable specification
//! of one HTTP request. It is validated at construction (the URL must parse
//! and carry an http/https scheme) so that a malformed request is rejected
//! before any I/O happens, then handed by value reference to the engine,
//! which never mutates it.

use bytes::Bytes;
use url::Url;

use crate::core::headers::Headers;
use crate::utils::error::{Error, Result};

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// The canonical uppercase token for the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field or file of a multipart upload.
///
/// With a `filename` the part is encoded as a file part and gets a
/// `Content-Type` guessed from the filename extension; without one it is a
/// plain form field.
#[derive(Debug, Clone)]
pub struct FileAttachment {
    /// Form field name
    pub field_name: String,
    /// Raw payload, treated as opaque bytes
    pub data: Bytes,
    /// Filename for file parts; `None` for plain fields
    pub filename: Option<String>,
}

impl FileAttachment {
    /// A plain form field.
    pub fn field(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            field_name: name.into(),
            data: data.into(),
            filename: None,
        }
    }

    /// A file part with a filename.
    pub fn file(name: impl Into<String>, data: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self {
            field_name: name.into(),
            data: data.into(),
            filename: Some(filename.into()),
        }
    }
}

/// The immutable specification of one HTTP request.
///
/// Built with [`RequestDescriptor::new`] (or the per-method shorthands) and
/// the chainable builder methods, then passed to
/// [`RequestEngine::send`](crate::core::engine::RequestEngine::send).
///
/// When `files` is non-empty the request body is the multipart encoding of
/// the attachments; any raw `body` value is ignored.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub(crate) url: Url,
    pub(crate) method: Method,
    pub(crate) headers: Headers,
    pub(crate) body: Option<Bytes>,
    pub(crate) files: Vec<FileAttachment>,
    pub(crate) follow_redirects: bool,
    pub(crate) json: bool,
    pub(crate) auto_string: bool,
}

impl RequestDescriptor {
    /// Create a descriptor for `method` against an absolute http(s) URL.
    ///
    /// Fails with [`Error::InvalidDescriptor`] when the URL does not parse
    /// or uses an unsupported scheme — before any I/O is attempted.
    pub fn new(method: Method, url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| Error::invalid(format!("unparseable URL {url:?}: {e}")))?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(Error::invalid(format!(
                    "unsupported URL scheme {scheme:?}, only http and https are supported"
                )));
            }
        }
        if url.host_str().is_none() {
            return Err(Error::invalid("URL has no host"));
        }
        Ok(Self {
            url,
            method,
            headers: Headers::new(),
            body: None,
            files: Vec::new(),
            follow_redirects: true,
            json: false,
            auto_string: true,
        })
    }

    /// Shorthand for a GET descriptor.
    pub fn get(url: &str) -> Result<Self> {
        Self::new(Method::Get, url)
    }

    /// Shorthand for a HEAD descriptor.
    pub fn head(url: &str) -> Result<Self> {
        Self::new(Method::Head, url)
    }

    /// Shorthand for a POST descriptor.
    pub fn post(url: &str) -> Result<Self> {
        Self::new(Method::Post, url)
    }

    /// Shorthand for a PUT descriptor.
    pub fn put(url: &str) -> Result<Self> {
        Self::new(Method::Put, url)
    }

    /// Shorthand for a PATCH descriptor.
    pub fn patch(url: &str) -> Result<Self> {
        Self::new(Method::Patch, url)
    }

    /// Shorthand for a DELETE descriptor.
    pub fn delete(url: &str) -> Result<Self> {
        Self::new(Method::Delete, url)
    }

    /// Set a request header. Names are lowercased; setting the same name
    /// twice keeps the last value.
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set multiple request headers at once.
    pub fn headers<N, V>(mut self, headers: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set the raw request payload. Ignored when attachments are present.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach a multipart field or file. Attachments force the body to be
    /// multipart/form-data, overriding any raw payload.
    pub fn attach(mut self, attachment: FileAttachment) -> Self {
        self.files.push(attachment);
        self
    }

    /// Attach several multipart parts in order.
    pub fn attach_all(mut self, attachments: impl IntoIterator<Item = FileAttachment>) -> Self {
        self.files.extend(attachments);
        self
    }

    /// Whether 3xx responses are followed (default `true`).
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// JSON mode: sends `content-type: application/json` when no content
    /// type was set, and decodes text response bodies as JSON when they
    /// parse (default `false`).
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// When `true` (the default), response bodies that are neither JSON nor
    /// form data decode to text; when `false` they stay raw bytes.
    pub fn auto_string(mut self, auto_string: bool) -> Self {
        self.auto_string = auto_string;
        self
    }

    /// The request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The request method.
    pub fn method(&self) -> Method {
        self.method
    }
}
