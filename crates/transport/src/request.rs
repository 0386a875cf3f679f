use serde::Serialize;
use serde_json::Value;

/// Path of the Better BibTeX JSON-RPC endpoint.
pub const RPC_PATH: &str = "/better-bibtex/json-rpc";

/// A JSON-RPC 2.0 request body.
///
/// Better BibTeX doesn't require (or echo) a request `id`, so none is sent.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    jsonrpc: &'static str,
    pub method: &'a str,
    /// Positional parameters; always a JSON array.
    pub params: &'a Value,
}
impl<'a> RpcRequest<'a> {
    pub fn new(method: &'a str, params: &'a Value) -> Self {
        Self { jsonrpc: "2.0", method, params }
    }
}
