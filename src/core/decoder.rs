//! Response body decoding
//!
//! Turns the completed response bytes into the decoded view: transparent
//! gzip/deflate decompression when the headers declare it, then
//! content-type sniffing into JSON, form data or text. Pure function of its
//! inputs; the only observable failure is a malformed compressed payload.

use std::io::Read;

use bytes::Bytes;
use tracing::debug;

use crate::core::headers::Headers;
use crate::core::response::DecodedBody;
use crate::utils::error::{Error, Result};

/// The decoder's output: post-decompression bytes plus their projections.
#[derive(Debug, Clone)]
pub(crate) struct Decoded {
    pub raw: Bytes,
    pub text: String,
    pub body: DecodedBody,
}

/// Decode a completed response body.
///
/// `auto_string` selects text over raw bytes for unrecognized content types;
/// `force_json` additionally attempts JSON parsing of text bodies (the
/// descriptor's JSON mode).
pub(crate) fn decode_body(
    status: u16,
    headers: &Headers,
    raw: Bytes,
    auto_string: bool,
    force_json: bool,
) -> Result<Decoded> {
    // 204/304 and explicit zero-length responses carry no body; never run
    // the declared content-encoding against them.
    let raw = if status == 204 || status == 304 || headers.get("content-length") == Some("0") {
        Bytes::new()
    } else {
        decompress(headers, raw)?
    };

    let text = String::from_utf8_lossy(&raw).into_owned();
    let body = sniff(headers, &raw, &text, auto_string, force_json);

    Ok(Decoded { raw, text, body })
}

/// Apply the declared `content-encoding`, if it is one we understand.
fn decompress(headers: &Headers, raw: Bytes) -> Result<Bytes> {
    let encoding = match headers.get("content-encoding") {
        Some(value) => value.trim().to_ascii_lowercase(),
        None => return Ok(raw),
    };

    match encoding.as_str() {
        "gzip" => {
            let mut decoded = Vec::new();
            flate2::read::GzDecoder::new(raw.as_ref())
                .read_to_end(&mut decoded)
                .map_err(|e| Error::Decompression {
                    message: format!("gzip: {e}"),
                })?;
            Ok(Bytes::from(decoded))
        }
        "deflate" => {
            // HTTP "deflate" officially means zlib-wrapped, but some servers
            // send raw deflate; try the wrapper first.
            let mut decoded = Vec::new();
            if flate2::read::ZlibDecoder::new(raw.as_ref())
                .read_to_end(&mut decoded)
                .is_ok()
            {
                return Ok(Bytes::from(decoded));
            }
            let mut decoded = Vec::new();
            flate2::read::DeflateDecoder::new(raw.as_ref())
                .read_to_end(&mut decoded)
                .map_err(|e| Error::Decompression {
                    message: format!("deflate: {e}"),
                })?;
            Ok(Bytes::from(decoded))
        }
        _ => Ok(raw),
    }
}

/// Sniff the decoded body from the `content-type` header.
fn sniff(
    headers: &Headers,
    raw: &Bytes,
    text: &str,
    auto_string: bool,
    force_json: bool,
) -> DecodedBody {
    let media_type = headers
        .get("content-type")
        .map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or("")
                .trim()
                .to_ascii_lowercase()
        })
        .unwrap_or_default();

    match media_type.as_str() {
        "application/json" => match serde_json::from_str(text) {
            Ok(value) => return DecodedBody::Json(value),
            Err(e) => {
                // Malformed JSON falls back to the text, never an error.
                debug!(error = %e, "declared JSON body did not parse, keeping text");
            }
        },
        "application/x-www-form-urlencoded" => {
            let pairs = url::form_urlencoded::parse(raw.as_ref())
                .into_owned()
                .collect();
            return DecodedBody::Form(pairs);
        }
        _ => {}
    }

    if force_json {
        if let Ok(value) = serde_json::from_str(text) {
            return DecodedBody::Json(value);
        }
    }

    if auto_string {
        DecodedBody::Text(text.to_string())
    } else {
        DecodedBody::Bytes(raw.clone())
    }
}
