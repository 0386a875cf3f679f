use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Library id of the user's personal library.
pub const USER_LIBRARY: u64 = 1;

/// A Better BibTeX citation key, scoped to the library the item lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CiteKey {
    pub key: String,
    pub library: u64,
}
impl CiteKey {
    pub fn new(key: impl Into<String>, library: u64) -> Self {
        Self { key: key.into(), library }
    }
}

/// Parses `key` (personal library) or `key@library`.
///
/// # Examples
///
/// ```
/// use zotlink_protocol::models::CiteKey;
/// assert_eq!("doe2020".parse::<CiteKey>().unwrap(), CiteKey::new("doe2020", 1));
/// assert_eq!("doe2020@4".parse::<CiteKey>().unwrap(), CiteKey::new("doe2020", 4));
/// ```
impl FromStr for CiteKey {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (key, library) = match s.rsplit_once('@') {
            Some((key, library)) => match library.parse::<u64>() {
                Ok(library) => (key, library),
                Err(_) => exn::bail!(ErrorKind::ParseError {
                    field: "citekey",
                    value: format!("invalid library id in {s:?}"),
                }),
            },
            None => (s, USER_LIBRARY),
        };
        if key.is_empty() {
            exn::bail!(ErrorKind::ParseError { field: "citekey", value: s.to_string() });
        }
        Ok(Self::new(key, library))
    }
}

impl Display for CiteKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.library {
            USER_LIBRARY => write!(f, "{}", self.key),
            library => write!(f, "{}@{library}", self.key),
        }
    }
}
