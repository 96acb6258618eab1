//! multipart/form-data encoding for file uploads
//!
//! Serializes the descriptor's attachments, in input order, into a single
//! body plus the matching `content-type` header value. Attachment data is
//! treated as opaque bytes end to end.

use bytes::Bytes;
use rand::Rng;

use crate::core::request::FileAttachment;

/// An encoded multipart/form-data payload.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    bytes: Bytes,
}

impl MultipartBody {
    /// The boundary token separating the parts.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// The `content-type` header value announcing this body.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// The encoded body bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Consume the payload, returning the encoded body.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

/// Encode attachments into a multipart/form-data body with a random
/// boundary.
///
/// The boundary is a 128-bit random hex token; at that size a collision
/// with payload content is not a practical concern and no runtime scan is
/// performed.
pub fn encode(files: &[FileAttachment]) -> MultipartBody {
    let boundary = format!("----nekocurl{:032x}", rand::thread_rng().r#gen::<u128>());
    let mut body: Vec<u8> = Vec::new();

    for attachment in files {
        body.extend_from_slice(b"--");
        body.extend_from_slice(boundary.as_bytes());
        body.extend_from_slice(b"\r\n");
        match &attachment.filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        attachment.field_name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(
                    format!("Content-Type: {}\r\n", guess_content_type(filename)).as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n",
                        attachment.field_name
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&attachment.data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(b"--");
    body.extend_from_slice(boundary.as_bytes());
    body.extend_from_slice(b"--\r\n");

    MultipartBody {
        boundary,
        bytes: Bytes::from(body),
    }
}

/// Guess a part's content type from its filename extension.
fn guess_content_type(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "txt" | "text" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}
