//! Error handling for the request engine
//!
//! This module defines all error types surfaced by `send` and the transport
//! drivers. Nothing is retried automatically; every failure is reported to
//! the immediate caller.

use std::time::Duration;

use thiserror::Error;

use crate::core::response::ResponseResult;

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the request engine
#[derive(Error, Debug)]
pub enum Error {
    /// The request descriptor was malformed (unparseable URL, unsupported
    /// scheme). Rejected before any I/O is attempted.
    #[error("invalid request descriptor: {message}")]
    InvalidDescriptor {
        /// What was wrong with the descriptor
        message: String,
    },

    /// Connection-level failure: DNS resolution, refused or reset
    /// connections, TLS handshake failures, premature close, or response
    /// framing the peer sent that cannot be parsed.
    #[error("transport error: {message}")]
    Transport {
        /// Underlying failure description
        message: String,
    },

    /// The response declared a `content-encoding` but the payload would not
    /// decompress.
    #[error("decompression failed: {message}")]
    Decompression {
        /// Underlying decoder failure
        message: String,
    },

    /// The server produced a terminal response with a status outside
    /// `200..300`. The fully decoded response is attached so callers can
    /// inspect status, headers and body.
    #[error("HTTP {}: {}", response.status, response.status_text)]
    Http {
        /// The complete decoded response
        response: Box<ResponseResult>,
    },

    /// The redirect hop cap was exceeded.
    #[error("stopped after {hops} redirect hops")]
    TooManyRedirects {
        /// Number of hops taken before giving up
        hops: u32,
    },

    /// The configured total timeout elapsed before a terminal outcome.
    #[error("request timed out after {after:?}")]
    Timeout {
        /// The timeout that was configured
        after: Duration,
    },
}

impl Error {
    /// Shorthand for a `Transport` error with a formatted message.
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Error::Transport {
            message: message.into(),
        }
    }

    /// Shorthand for an `InvalidDescriptor` error.
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidDescriptor {
            message: message.into(),
        }
    }

    /// The HTTP status carried by this error, if it is an `Http` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { response } => Some(response.status),
            _ => None,
        }
    }

    /// The full response carried by this error, if it is an `Http` error.
    pub fn response(&self) -> Option<&ResponseResult> {
        match self {
            Error::Http { response } => Some(response),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Transport {
            message: err.to_string(),
        }
    }
}
