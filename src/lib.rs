//! # nekocurl
//!
//! A pluggable HTTP client: build an immutable request descriptor, hand it
//! to the request engine, get one normalized result back. The engine
//! delegates the physical exchange to an interchangeable transport driver —
//! by default a self-contained HTTP/1.1 client over raw sockets.
//!
//! ## Features
//!
//! - **Pluggable transports**: the `Driver` trait with a from-scratch
//!   socket implementation and a reqwest-backed one, selected by explicit
//!   construction rather than a global registry
//! - **Transparent compression**: gzip/deflate response bodies are decoded
//!   before content sniffing
//! - **Redirect handling**: per-status-code semantics (301/302/303 rewrite
//!   the method and drop the body, 307/308 preserve both) behind a bounded
//!   hop loop
//! - **Multipart uploads**: file attachments are encoded as
//!   multipart/form-data with a random boundary
//! - **One result per send**: 2xx responses return a decoded
//!   [`ResponseResult`]; non-2xx responses surface as [`Error::Http`]
//!   carrying the same fully decoded response
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nekocurl::{RequestDescriptor, RequestEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = RequestEngine::default();
//!
//!     let descriptor = RequestDescriptor::get("https://curl.neko.run/get")?
//!         .header("accept", "application/json")
//!         .json(true);
//!
//!     let response = engine.send(&descriptor).await?;
//!     println!("{}: {:?}", response.status, response.body);
//!     Ok(())
//! }
//! ```
//!
//! ## Uploading files
//!
//! ```rust,no_run
//! use nekocurl::{FileAttachment, RequestDescriptor, RequestEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let descriptor = RequestDescriptor::post("https://curl.neko.run/post")?
//!         .attach(FileAttachment::file("image", &b"\x89PNG..."[..], "image.png"))
//!         .attach(FileAttachment::field("comment", "look at this cat"));
//!
//!     let response = RequestEngine::default().send(&descriptor).await?;
//!     println!("uploaded: {}", response.status);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod core;
pub mod utils;

// Re-export main types
pub use utils::error::{Error, Result};

pub use core::drivers::{Driver, ReqwestDriver, SocketDriver, SocketDriverConfig, WireRequest};
pub use core::engine::{EngineConfig, RequestEngine};
pub use core::headers::Headers;
pub use core::multipart::MultipartBody;
pub use core::request::{FileAttachment, Method, RequestDescriptor};
pub use core::response::{BodyStream, DecodedBody, Outcome, RawResponse, ResponseResult};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
