//! JSON-RPC response envelopes.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;

/// Unwrap a JSON-RPC response body into its `result`.
///
/// - `{"result": ...}` returns the result, which may legitimately be `null`.
/// - `{"error": {"message": ...}}` is promoted to [`ErrorKind::Remote`].
/// - Anything that isn't JSON is [`ErrorKind::InvalidJson`].
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use zotlink_protocol::{error::ErrorKind, parse_result};
///
/// assert_eq!(parse_result(r#"{"jsonrpc":"2.0","result":[1,2]}"#).unwrap(), json!([1, 2]));
/// let err = parse_result(r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"no such method"}}"#).unwrap_err();
/// assert_eq!(*err, ErrorKind::Remote("no such method".to_string()));
/// ```
#[instrument(level = "trace", skip(body), fields(body_size = body.len()))]
pub fn parse_result(body: &str) -> Result<Value> {
    let envelope: Value = serde_json::from_str(body).or_raise(|| ErrorKind::InvalidJson)?;
    let Value::Object(mut envelope) = envelope else {
        exn::bail!(ErrorKind::UnexpectedShape("JSON-RPC envelope"));
    };
    if let Some(error) = envelope.remove("error").filter(|e| !e.is_null()) {
        exn::bail!(ErrorKind::Remote(error_message(&error)));
    }
    match envelope.remove("result") {
        Some(result) => Ok(result),
        None => exn::bail!(ErrorKind::MissingResult),
    }
}

/// [`parse_result`], then deserialize the result into `T`.
///
/// `expected` names the structure for the error message.
pub fn parse_result_as<T: DeserializeOwned>(body: &str, expected: &'static str) -> Result<T> {
    let result = parse_result(body)?;
    serde_json::from_value(result).or_raise(|| ErrorKind::UnexpectedShape(expected))
}

fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => match fields.get("message") {
            Some(Value::String(message)) => message.clone(),
            _ => error.to_string(),
        },
        other => other.to_string(),
    }
}
