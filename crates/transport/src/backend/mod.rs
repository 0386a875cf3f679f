//! Transport trait and implementations.
//!
//! This module defines the [`Transport`] trait, the one seam between the
//! domain operations and the network. It deliberately knows nothing about
//! what the service returns: bodies come back as raw text and parsing is
//! the caller's job.

mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::http::HttpTransport;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::{Call, MockTransport};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Sends single requests to a Better BibTeX service.
///
/// Implementations send exactly one request per call and never retry.
/// Serializing calls is **not** the transport's concern; callers queue
/// before calling.
///
/// # Examples
///
/// ```no_run
/// use serde_json::json;
/// use zotlink_transport::{Transport, error::Result};
///
/// async fn search(transport: &dyn Transport) -> Result<String> {
///     transport.rpc("item.search", &json!(["smith"])).await
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Human readable description of the endpoint (used for logging only).
    fn name(&self) -> &str;

    /// POST a JSON-RPC request and return the raw response body.
    ///
    /// `params` are the positional parameters and should be a JSON array.
    async fn rpc(&self, method: &str, params: &Value) -> Result<String>;

    /// GET `path_and_query` (relative to the service root) and return the
    /// raw response body.
    ///
    /// The path is passed through verbatim, so any user-supplied segment
    /// must already be percent-encoded.
    async fn get(&self, path_and_query: &str) -> Result<String>;
}
