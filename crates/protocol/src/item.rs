//! Item records. The schema belongs to the reference manager, so records
//! stay `serde_json::Value` and only the few fields we look at are read.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use tracing::instrument;

const CITEKEY_FIELDS: [&str; 3] = ["citationKey", "citekey", "citation-key"];

/// The citation key of an item record.
pub fn citekey_of(item: &Value) -> Option<&str> {
    CITEKEY_FIELDS.iter().find_map(|field| item.get(*field)?.as_str())
}

/// Unwrap an `item.export` result into its item records.
///
/// Depending on the service version the result is either
/// `[status, contentType, payload]` or the payload on its own. The payload
/// may be a JSON document serialized into a string, and is either a list of
/// items or an object holding them in `items`.
#[instrument(level = "trace", skip(result))]
pub fn normalize_export(result: Value) -> Result<Vec<Value>> {
    let payload = match result {
        Value::Array(mut parts) if parts.first().is_some_and(Value::is_number) => {
            if parts.len() < 3 {
                exn::bail!(ErrorKind::UnexpectedShape("[status, contentType, payload]"));
            }
            parts.swap_remove(2)
        },
        payload => payload,
    };
    let payload = match payload {
        Value::String(document) => serde_json::from_str(&document).or_raise(|| ErrorKind::InvalidJson)?,
        payload => payload,
    };
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut document) => match document.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            _ => exn::bail!(ErrorKind::UnexpectedShape("export document with items")),
        },
        _ => exn::bail!(ErrorKind::UnexpectedShape("exported items")),
    }
}

/// Parse an `item.citationkey` result: relation URI (or item key) to citation
/// key. Entries that didn't resolve are left out.
pub fn citation_keys(result: Value) -> Result<HashMap<String, String>> {
    let Value::Object(resolved) = result else {
        exn::bail!(ErrorKind::UnexpectedShape("citation keys keyed by item"));
    };
    Ok(resolved
        .into_iter()
        .filter_map(|(uri, citekey)| match citekey {
            Value::String(citekey) if !citekey.is_empty() => Some((uri, citekey)),
            _ => None,
        })
        .collect())
}

/// A stand-in for an item that couldn't be found.
pub fn placeholder(uri: &str) -> Value {
    json!({ "uri": uri })
}

/// Line up fetched `items` with the relation `uris` they were requested for.
///
/// The output has exactly one entry per URI, in input order: the item whose
/// citation key `resolved` maps that URI to, or a [`placeholder`].
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use std::collections::HashMap;
/// use zotlink_protocol::merge_relations;
///
/// let uris = ["u1".to_string(), "u2".to_string()];
/// let resolved = HashMap::from([("u2".to_string(), "doe".to_string())]);
/// let items = vec![json!({"citationKey": "doe"})];
/// assert_eq!(merge_relations(&uris, &resolved, items), vec![json!({"uri": "u1"}), json!({"citationKey": "doe"})]);
/// ```
pub fn merge_relations(uris: &[String], resolved: &HashMap<String, String>, items: Vec<Value>) -> Vec<Value> {
    let by_citekey: HashMap<String, Value> = items
        .into_iter()
        .filter_map(|item| Some((citekey_of(&item)?.to_string(), item)))
        .collect();
    uris.iter()
        .map(|uri| {
            resolved
                .get(uri)
                .and_then(|citekey| by_citekey.get(citekey))
                .cloned()
                .unwrap_or_else(|| placeholder(uri))
        })
        .collect()
}

/// The library name declared by the search record for exactly `citekey`.
pub fn search_library<'a>(records: &'a [Value], citekey: &str) -> Option<&'a str> {
    let record = records.iter().find(|record| citekey_of(record) == Some(citekey))?;
    match record.get("library")? {
        Value::String(name) => Some(name.as_str()),
        Value::Object(library) => library_name(library),
        _ => None,
    }
}

fn library_name(library: &Map<String, Value>) -> Option<&str> {
    library.get("name")?.as_str()
}
