use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Better BibTeX JSON: full item records, used for item exports.
pub const ITEM_TRANSLATOR: &str = "36a3b0b5-bad0-4a04-b79b-441c7cef77db";
/// Better CSL JSON: only needed for the `issued` date parts.
pub const DATE_TRANSLATOR: &str = "f4b52ab0-f878-4556-85a0-c7aeedd09dfc";
/// Extension selecting Better CSL JSON on the library export endpoint.
pub const CITEKEY_EXPORT_FORMAT: &str = "json";

pub const EXPORT_PATH: &str = "/better-bibtex/export/library";
pub const PROBE_PATH: &str = "/better-bibtex/cayw?probe=probe";
/// Body returned by the probe endpoint when the service is up.
pub const PROBE_READY: &str = "ready";

/// JSON-RPC method names.
pub mod method {
    pub const ATTACHMENTS: &str = "item.attachments";
    pub const BIBLIOGRAPHY: &str = "item.bibliography";
    pub const CITATION_KEY: &str = "item.citationkey";
    pub const COLLECTIONS: &str = "item.collections";
    pub const EXPORT: &str = "item.export";
    pub const NOTES: &str = "item.notes";
    pub const SEARCH: &str = "item.search";
    pub const GROUPS: &str = "user.groups";
}

// citeproc-js fails on an empty document fragment when Quick Copy points at an
// export translator instead of a citation style, or the style renders nothing.
regex!(
    EMPTY_FRAGMENT_REGEX,
    r"(?i)\bempty\b.*\b(?:fragment|bibliography)\b|\b(?:fragment|bibliography)\b.*\bempty\b|reading 'children'|element\.children is undefined"
);
