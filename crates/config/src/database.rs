use crate::error::{ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Default Better BibTeX port of a Zotero installation.
pub const ZOTERO_PORT: u16 = 23119;
/// Default Better BibTeX port of a Juris-M installation.
pub const JURIS_M_PORT: u16 = 24119;

/// Which reference manager (profile) to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Database {
    #[default]
    Zotero,
    #[serde(rename = "Juris-M", alias = "JurisM")]
    JurisM,
    /// Anything else listening on a configured port.
    Custom,
}
impl Database {
    /// The well-known port, if there is one.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::Zotero => Some(ZOTERO_PORT),
            Self::JurisM => Some(JURIS_M_PORT),
            Self::Custom => None,
        }
    }
}
impl Display for Database {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Zotero => write!(f, "Zotero"),
            Self::JurisM => write!(f, "Juris-M"),
            Self::Custom => write!(f, "Custom"),
        }
    }
}
impl FromStr for Database {
    type Err = crate::error::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "zotero" => Ok(Self::Zotero),
            "jurism" => Ok(Self::JurisM),
            "custom" => Ok(Self::Custom),
            _ => exn::bail!(ErrorKind::UnknownDatabase(s.to_string())),
        }
    }
}

/// Resolve the local service port.
///
/// An explicit override always wins. Without one, the database's well-known
/// port is used; a [`Database::Custom`] without an override is an error
/// rather than a silent guess.
pub fn resolve_port(database: Database, port: Option<u16>) -> Result<u16> {
    match port.or(database.default_port()) {
        Some(port) => Ok(port),
        None => exn::bail!(ErrorKind::MissingPort(database)),
    }
}

/// Database selection together with its optional port override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatabaseWithPort {
    pub database: Database,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}
impl DatabaseWithPort {
    pub fn new(database: Database, port: Option<u16>) -> Self {
        Self { database, port }
    }

    /// See [`resolve_port`].
    pub fn port(&self) -> Result<u16> {
        resolve_port(self.database, self.port)
    }
}
impl From<Database> for DatabaseWithPort {
    fn from(database: Database) -> Self {
        Self::new(database, None)
    }
}
