//! Core request pipeline
//!
//! This module contains the request/response data model and the components
//! that turn one descriptor into one result: the multipart encoder, the
//! body decoder, the redirect resolver, the transport drivers and the
//! engine that orchestrates them.

pub mod decoder;
pub mod drivers;
pub mod engine;
pub mod headers;
pub mod multipart;
pub mod redirect;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use drivers::{Driver, ReqwestDriver, SocketDriver, SocketDriverConfig, WireRequest};
pub use engine::{EngineConfig, RequestEngine};
pub use headers::Headers;
pub use multipart::MultipartBody;
pub use request::{FileAttachment, Method, RequestDescriptor};
pub use response::{BodyStream, DecodedBody, Outcome, RawResponse, ResponseResult};
