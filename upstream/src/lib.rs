//! HTTP access to the hosted remote config service.

pub mod client;
pub mod errors;

pub use client::{ConfigClient, DEFAULT_ENDPOINT, Etag};
pub use errors::UpstreamError;
