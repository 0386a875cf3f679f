//! Layered configuration loading.
//!
//! Sources are merged in order, later sources overriding earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. `config.toml`, `config.yaml` and `config.json` inside the user's
//!    configuration directory (see [`Config::default_dir`]).
//! 3. An explicitly passed configuration file.
//! 4. Environment variables prefixed with `ZOTLINK_`, nested keys separated
//!    by a double underscore (`ZOTLINK_BIBLIOGRAPHY__STYLE=apa`).

use crate::database::{Database, DatabaseWithPort};
use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;

const ENV_PREFIX: &str = "ZOTLINK_";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Output format for rendered bibliographies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BibliographyFormat {
    /// HTML exactly as produced by the citation processor.
    #[default]
    Html,
    /// Plain text rendered by the citation processor.
    Text,
    /// HTML converted to Markdown locally.
    Markdown,
}

/// Defaults applied to bibliography requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BibliographyConfig {
    /// CSL style id; `None` uses the reference manager's Quick Copy setting.
    pub style: Option<String>,
    pub locale: Option<String>,
    pub format: BibliographyFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: Database,
    /// Overrides the database's well-known port.
    pub port: Option<u16>,
    /// HTTP request timeout, in seconds.
    pub request_timeout: u64,
    pub bibliography: BibliographyConfig,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            database: Database::default(),
            port: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            bibliography: BibliographyConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default locations and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(None::<&Path>)
    }

    /// Load configuration, additionally merging `file` (which must exist)
    /// on top of the default locations.
    #[instrument]
    pub fn load_from<P: AsRef<Path> + std::fmt::Debug>(file: Option<P>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(dir) = Self::default_dir() {
            figment = figment
                .merge(Toml::file(dir.join("config.toml")))
                .merge(Yaml::file(dir.join("config.yaml")))
                .merge(Json::file(dir.join("config.json")));
        }
        if let Some(file) = file {
            figment = Self::merge_file(figment, file.as_ref())?;
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        tracing::debug!(database = %config.database, port = ?config.port, "Loaded configuration");
        Ok(config)
    }

    /// Merge a single file, picking the provider from its extension.
    fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
        if !path.is_file() {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        let extension = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase);
        Ok(match extension.as_deref() {
            Some("toml") => figment.merge(Toml::file_exact(path)),
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
            Some("json") => figment.merge(Json::file_exact(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
        })
    }

    /// The per-user configuration directory, if the platform has one.
    pub fn default_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "zotlink").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// The configured database and port override.
    pub fn database(&self) -> DatabaseWithPort {
        DatabaseWithPort::new(self.database, self.port)
    }

    /// Resolve the port now, so that a misconfigured `Custom` database is
    /// reported at startup instead of on the first request.
    pub fn port(&self) -> Result<u16> {
        self.database().port()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::Builder;

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database, Database::Zotero);
        assert_eq!(config.port().unwrap(), 23119);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.bibliography.format, BibliographyFormat::Html);
    }

    #[rstest]
    #[case(".toml", "database = \"Juris-M\"\nport = 1234\n[bibliography]\nstyle = \"apa\"\nformat = \"markdown\"\n")]
    #[case(".yaml", "database: Juris-M\nport: 1234\nbibliography:\n  style: apa\n  format: markdown\n")]
    #[case(
        ".json",
        r#"{"database": "Juris-M", "port": 1234, "bibliography": {"style": "apa", "format": "markdown"}}"#
    )]
    fn test_load_explicit_file(#[case] suffix: &str, #[case] contents: &str) {
        let file = write_config(suffix, contents);
        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.database, Database::JurisM);
        assert_eq!(config.port().unwrap(), 1234);
        assert_eq!(config.bibliography.style.as_deref(), Some("apa"));
        assert_eq!(config.bibliography.format, BibliographyFormat::Markdown);
        // Untouched keys keep their defaults.
        assert_eq!(config.request_timeout, 30);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load_from(Some("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_unsupported_format() {
        let file = write_config(".ini", "database=Zotero");
        let err = Config::load_from(Some(file.path())).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
    }

    #[test]
    fn test_invalid_database() {
        let file = write_config(".toml", "database = \"Mendeley\"\n");
        let err = Config::load_from(Some(file.path())).unwrap_err();
        assert_eq!(*err, ErrorKind::Load);
    }

    #[test]
    fn test_custom_database_requires_port() {
        let file = write_config(".toml", "database = \"Custom\"\n");
        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(*config.port().unwrap_err(), ErrorKind::MissingPort(Database::Custom));
    }
}
