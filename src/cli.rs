//! Command line arguments.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use zotlink_client::{BibliographyFormat, BibliographyOptions};
use zotlink_config::{Config, Database};
use zotlink_protocol::models::CiteKey;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file, merged over the one in the user config directory.
    #[arg(short, long, global = true, env = "ZOTLINK_CONFIG")]
    pub config: Option<PathBuf>,
    /// Reference manager to talk to (zotero, juris-m or custom).
    #[arg(long, global = true, value_parser = parse_database)]
    pub database: Option<Database>,
    /// Port of the Better BibTeX service, required for a custom database.
    #[arg(long, global = true)]
    pub port: Option<u16>,
    /// Request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
    /// More logging on stderr (repeat for more).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Notes attached to items
    Notes {
        #[arg(required = true, value_parser = parse_citekey)]
        citekeys: Vec<CiteKey>,
    },
    /// Render a bibliography
    Bib {
        #[arg(required = true, value_parser = parse_citekey)]
        citekeys: Vec<CiteKey>,
        /// CSL style id; defaults to the reference manager's Quick Copy setting.
        #[arg(short, long)]
        style: Option<String>,
        #[arg(short, long)]
        locale: Option<String>,
        #[arg(short, long, value_enum)]
        format: Option<Format>,
    },
    /// Full item records
    Items {
        #[arg(required = true, value_parser = parse_citekey)]
        citekeys: Vec<CiteKey>,
        /// Library to export from; defaults to the first citation key's.
        #[arg(long)]
        library: Option<u64>,
    },
    /// Item records for relation URIs, in the same order
    Relations {
        #[arg(required = true)]
        uris: Vec<String>,
        #[arg(long, default_value_t = zotlink_protocol::models::USER_LIBRARY)]
        library: u64,
    },
    /// Collections an item is filed in
    Collections {
        #[arg(value_parser = parse_citekey)]
        citekey: CiteKey,
    },
    /// Attachments of an item
    Attachments {
        #[arg(value_parser = parse_citekey)]
        citekey: CiteKey,
    },
    /// When an item was issued
    IssueDate {
        #[arg(value_parser = parse_citekey)]
        citekey: CiteKey,
        /// Fill in a missing month or day with the first.
        #[arg(long)]
        calendar: bool,
    },
    /// Search all libraries
    Search { term: String },
    /// Libraries the user can access
    Groups,
    /// Citation keys of one library
    Export { group_id: u64, group_name: String },
    /// Citation keys of every library
    Citekeys {
        /// Ignore the cached export.
        #[arg(long)]
        force: bool,
    },
    /// Library id of a citation key
    Library { citekey: String },
    /// Check that the service is running
    Ping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Html,
    Text,
    Markdown,
}
impl From<Format> for BibliographyFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Html => Self::Html,
            Format::Text => Self::Text,
            Format::Markdown => Self::Markdown,
        }
    }
}

impl Cli {
    /// Command line flags override every configuration source.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(database) = self.database {
            config.database = database;
        }
        if self.port.is_some() {
            config.port = self.port;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout = timeout;
        }
        config
    }
}

/// Merge bibliography flags over the configured defaults.
pub fn bibliography_options(
    defaults: &BibliographyOptions,
    style: Option<String>,
    locale: Option<String>,
    format: Option<Format>,
) -> BibliographyOptions {
    BibliographyOptions {
        style: style.or_else(|| defaults.style.clone()),
        locale: locale.or_else(|| defaults.locale.clone()),
        format: format.map(Into::into).unwrap_or(defaults.format),
    }
}

fn parse_database(s: &str) -> Result<Database, String> {
    s.parse().map_err(|err: zotlink_config::error::Error| (*err).to_string())
}

fn parse_citekey(s: &str) -> Result<CiteKey, String> {
    s.parse().map_err(|err: zotlink_protocol::error::Error| (*err).to_string())
}
