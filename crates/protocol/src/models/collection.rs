//! Collection membership, as returned by `item.collections` with parents
//! included.
//!
//! Each collection names its parent through `parentCollection`, which is
//! `false` (or `null`, or absent) for a top-level collection, and otherwise
//! either the parent collection itself or just its key.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Guards against parent cycles in malformed responses.
const MAX_DEPTH: usize = 64;

/// A collection an item belongs to, with its full path from the library root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionPath {
    pub key: String,
    pub name: String,
    /// Collection names from the root down to this one, joined with `/`.
    pub full_path: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawCollection {
    key: String,
    name: String,
    #[serde(default, rename = "parentCollection")]
    parent: Option<Parent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Parent {
    Collection(Box<RawCollection>),
    Key(String),
    Root(bool),
}

impl RawCollection {
    fn path(&self, siblings: &[RawCollection]) -> String {
        let mut names = vec![self.name.as_str()];
        let mut parent = self.parent.as_ref();
        while let Some(next) = parent
            && names.len() < MAX_DEPTH
        {
            let collection = match next {
                Parent::Collection(collection) => collection.as_ref(),
                Parent::Key(key) => match siblings.iter().find(|c| &c.key == key) {
                    Some(collection) => collection,
                    None => break,
                },
                Parent::Root(_) => break,
            };
            names.push(collection.name.as_str());
            parent = collection.parent.as_ref();
        }
        names.reverse();
        names.join("/")
    }
}

/// Build collection paths for `citekey` from an `item.collections` result.
///
/// The result is keyed by citation key; a bare list of collections is also
/// accepted. A citation key the service doesn't know yields an empty list.
pub fn collection_paths(result: Value, citekey: &str) -> Result<Vec<CollectionPath>> {
    let collections = match result {
        Value::Object(mut by_key) => by_key.remove(citekey).unwrap_or(Value::Array(Vec::new())),
        Value::Null => Value::Array(Vec::new()),
        list => list,
    };
    let collections: Vec<RawCollection> =
        serde_json::from_value(collections).or_raise(|| ErrorKind::UnexpectedShape("list of collections"))?;
    Ok(collections
        .iter()
        .map(|c| CollectionPath { key: c.key.clone(), name: c.name.clone(), full_path: c.path(&collections) })
        .collect())
}
