use crate::error::{ErrorKind, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The notes attached to one item, as HTML bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub citekey: String,
    pub bodies: Vec<String>,
}

/// Pick the notes for `citekeys`, in that order, out of an `item.notes`
/// result keyed by citation key.
///
/// Keys missing from the result are left out. Each note is either the HTML
/// body itself or a note item carrying it in `note`.
pub fn notes_for(result: &Value, citekeys: &[&str]) -> Result<Vec<Note>> {
    let Some(by_key) = result.as_object() else {
        exn::bail!(ErrorKind::UnexpectedShape("notes keyed by citation key"));
    };
    Ok(citekeys
        .iter()
        .filter_map(|citekey| {
            let entries = by_key.get(*citekey)?.as_array()?;
            let bodies = entries
                .iter()
                .filter_map(|entry| match entry {
                    Value::String(body) => Some(body.clone()),
                    entry => entry.get("note")?.as_str().map(str::to_string),
                })
                .collect();
            Some(Note { citekey: citekey.to_string(), bodies })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_input_order_and_missing_keys() {
        let result = json!({
            "b": [{"note": "<p>second</p>", "key": "N2"}],
            "a": ["<p>first</p>", {"key": "N9"}],
        });
        let notes = notes_for(&result, &["a", "missing", "b"]).unwrap();
        assert_eq!(
            notes,
            vec![
                Note { citekey: "a".to_string(), bodies: vec!["<p>first</p>".to_string()] },
                Note { citekey: "b".to_string(), bodies: vec!["<p>second</p>".to_string()] },
            ]
        );
    }

    #[test]
    fn test_wrong_shape() {
        let err = notes_for(&json!([]), &["a"]).unwrap_err();
        assert_eq!(*err, ErrorKind::UnexpectedShape("notes keyed by citation key"));
    }
}
