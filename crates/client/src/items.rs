//! Operations on individual items.

use crate::Client;
use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use tracing::instrument;
use zotlink_config::{BibliographyConfig as BibliographyOptions, BibliographyFormat};
use zotlink_protocol::error::ErrorKind as ProtocolErrorKind;
use zotlink_protocol::models::{CiteKey, CollectionPath, IssueDate, Note, collection_paths, notes_for};
use zotlink_protocol::{
    DATE_TRANSLATOR, ITEM_TRANSLATOR, citation_keys, html_to_markdown, is_empty_fragment, merge_relations, method,
    normalize_export, parse_result, placeholder,
};

fn keys(citekeys: &[CiteKey]) -> Vec<&str> {
    citekeys.iter().map(|c| c.key.as_str()).collect()
}

fn list(result: Value, expected: &'static str) -> Result<Vec<Value>> {
    match result {
        Value::Array(values) => Ok(values),
        Value::Null => Ok(Vec::new()),
        _ => Err(ErrorKind::protocol(exn::Exn::from(ProtocolErrorKind::UnexpectedShape(expected)))),
    }
}

impl Client {
    /// Notes for each citation key, in input order, fetched in one request.
    ///
    /// Keys the service has no entry for are left out of the result.
    #[instrument(skip(self, citekeys), fields(count = citekeys.len()))]
    pub async fn notes(&self, citekeys: &[CiteKey]) -> Option<Vec<Note>> {
        let result = self.notes_inner(citekeys).await;
        self.settle("notes", result.map(Some))
    }

    async fn notes_inner(&self, citekeys: &[CiteKey]) -> Result<Vec<Note>> {
        if citekeys.is_empty() {
            return Ok(Vec::new());
        }
        let keys = keys(citekeys);
        let result = self.call(method::NOTES, json!([keys])).await?;
        notes_for(&result, &keys).map_err(ErrorKind::protocol)
    }

    /// The collections an item is filed in, each with its full path.
    #[instrument(skip(self), fields(citekey = %citekey))]
    pub async fn collections(&self, citekey: &CiteKey) -> Option<Vec<CollectionPath>> {
        let result = async {
            let result = self.call(method::COLLECTIONS, json!([[citekey.key], true])).await?;
            collection_paths(result, &citekey.key).map_err(ErrorKind::protocol)
        };
        self.settle("collections", result.await.map(Some))
    }

    /// The attachments of an item, as the service describes them.
    #[instrument(skip(self), fields(citekey = %citekey))]
    pub async fn attachments(&self, citekey: &CiteKey) -> Option<Vec<Value>> {
        let result = async {
            let result = self.call(method::ATTACHMENTS, json!([citekey.key, citekey.library])).await?;
            list(result, "list of attachments")
        };
        self.settle("attachments", result.await.map(Some))
    }

    /// Render a bibliography for `citekeys`.
    ///
    /// Without a style, the service renders with its Quick Copy setting. An
    /// empty rendering is reported as a failure with a hint on how to fix it.
    /// All keys are rendered from the library of the first one.
    #[instrument(skip(self, citekeys), fields(count = citekeys.len(), format = ?options.format))]
    pub async fn bibliography(&self, citekeys: &[CiteKey], options: &BibliographyOptions) -> Option<String> {
        let result = self.bibliography_inner(citekeys, options).await;
        self.settle("bibliography", result)
    }

    async fn bibliography_inner(&self, citekeys: &[CiteKey], options: &BibliographyOptions) -> Result<Option<String>> {
        let Some(library) = citekeys.first().map(|c| c.library) else {
            return Ok(None);
        };
        if citekeys.iter().any(|c| c.library != library) {
            tracing::debug!(library, "Citation keys span several libraries, rendering from the first");
        }
        let body = self.request(method::BIBLIOGRAPHY, json!([keys(citekeys), format_options(options), library])).await?;
        let rendered = match parse_result(&body) {
            Ok(Value::String(rendered)) => rendered,
            Ok(Value::Null) => String::new(),
            Ok(_) => return Err(ErrorKind::protocol(exn::Exn::from(ProtocolErrorKind::UnexpectedShape("string")))),
            Err(err) if matches!(&*err, ProtocolErrorKind::Remote(message) if is_empty_fragment(message)) => {
                return Err(err).or_raise(|| ErrorKind::EmptyBibliography);
            },
            Err(err) => return Err(ErrorKind::protocol(err)),
        };
        if rendered.trim().is_empty() {
            exn::bail!(ErrorKind::EmptyBibliography);
        }
        Ok(Some(match options.format {
            BibliographyFormat::Markdown => html_to_markdown(&rendered),
            BibliographyFormat::Html | BibliographyFormat::Text => rendered,
        }))
    }

    /// Full item records (Better BibTeX JSON) for `citekeys`.
    #[instrument(skip(self, citekeys), fields(count = citekeys.len()))]
    pub async fn items(&self, citekeys: &[CiteKey], library_id: u64) -> Option<Vec<Value>> {
        let result = self.items_inner(&keys(citekeys), library_id).await;
        self.settle("items", result.map(Some))
    }

    async fn items_inner(&self, keys: &[&str], library_id: u64) -> Result<Vec<Value>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let result = self.call(method::EXPORT, json!([keys, ITEM_TRANSLATOR, library_id])).await?;
        normalize_export(result).map_err(ErrorKind::protocol)
    }

    /// Item records for related items, one per URI and in the same order.
    ///
    /// URIs that don't resolve to a citation key, or whose item can't be
    /// fetched, are represented by `{"uri": ...}`.
    #[instrument(skip(self, uris), fields(count = uris.len()))]
    pub async fn items_by_relations(&self, library_id: u64, uris: &[String]) -> Option<Vec<Value>> {
        let resolved = async {
            let result = self.call(method::CITATION_KEY, json!([uris])).await?;
            citation_keys(result).map_err(ErrorKind::protocol)
        };
        let resolved: HashMap<String, String> = self.settle("items_by_relations", resolved.await.map(Some))?;

        let mut wanted: Vec<&str> = Vec::new();
        for citekey in uris.iter().filter_map(|uri| resolved.get(uri)) {
            if !wanted.contains(&citekey.as_str()) {
                wanted.push(citekey);
            }
        }
        if wanted.is_empty() {
            return Some(uris.iter().map(|uri| placeholder(uri)).collect());
        }
        let items = self.items_inner(&wanted, library_id).await;
        let items = self.settle("items_by_relations", items.map(Some)).unwrap_or_default();
        Some(merge_relations(uris, &resolved, items))
    }

    /// When an item was issued, from the first `date-parts` the service has.
    ///
    /// `as_string` keeps only the known parts (`2020-03`); otherwise missing
    /// month and day default to the first.
    #[instrument(skip(self), fields(citekey = %citekey))]
    pub async fn issue_date(&self, citekey: &CiteKey, as_string: bool) -> Option<IssueDate> {
        let result = async {
            let result = self.call(method::EXPORT, json!([[citekey.key], DATE_TRANSLATOR, citekey.library])).await?;
            let items = normalize_export(result).map_err(ErrorKind::protocol)?;
            let date = IssueDate::from_items(&items, as_string);
            if date.is_none() {
                tracing::debug!("No usable issue date");
            }
            Ok::<_, Error>(date)
        };
        self.settle("issue_date", result.await)
    }

    /// Free-text search across all libraries.
    #[instrument(skip(self))]
    pub async fn search(&self, term: &str) -> Option<Vec<Value>> {
        let result = async { list(self.call(method::SEARCH, json!([term])).await?, "list of search results") };
        self.settle("search", result.await.map(Some))
    }
}

fn format_options(options: &BibliographyOptions) -> Value {
    let mut format = Map::new();
    let content_type = match options.format {
        BibliographyFormat::Text => "text",
        BibliographyFormat::Html | BibliographyFormat::Markdown => "html",
    };
    format.insert("contentType".to_string(), json!(content_type));
    match &options.style {
        Some(style) => {
            format.insert("quickCopy".to_string(), json!(false));
            format.insert("id".to_string(), json!(style));
        },
        None => {
            format.insert("quickCopy".to_string(), json!(true));
        },
    }
    if let Some(locale) = &options.locale {
        format.insert("locale".to_string(), json!(locale));
    }
    Value::Object(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, BibliographyFormat::Html, json!({"quickCopy": true, "contentType": "html"}))]
    #[case(None, None, BibliographyFormat::Markdown, json!({"quickCopy": true, "contentType": "html"}))]
    #[case(Some("apa"), None, BibliographyFormat::Text, json!({"quickCopy": false, "id": "apa", "contentType": "text"}))]
    #[case(Some("apa"), Some("de-DE"), BibliographyFormat::Html, json!({"quickCopy": false, "id": "apa", "contentType": "html", "locale": "de-DE"}))]
    fn test_format_options(
        #[case] style: Option<&str>,
        #[case] locale: Option<&str>,
        #[case] format: BibliographyFormat,
        #[case] expected: Value,
    ) {
        let options =
            BibliographyOptions { style: style.map(String::from), locale: locale.map(String::from), format };
        assert_eq!(format_options(&options), expected);
    }
}
