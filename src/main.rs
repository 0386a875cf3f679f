mod cli;

use crate::cli::{Cli, Command, bibliography_options};
use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use zotlink_client::{Client, Notifier};
use zotlink_config::Config;

/// Exit status when the service had nothing to give (or couldn't be asked).
const ABSENT: u8 = 1;
/// Exit status for unusable configuration.
const MISCONFIGURED: u8 = 2;

/// Prints notices for the user on stderr, keeping stdout for results.
struct StderrNotifier;
impl Notifier for StderrNotifier {
    fn notice(&self, message: &str) {
        eprintln!("zotlink: {message}");
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn json<T: Serialize>(value: &T) -> Option<String> {
    serde_json::to_string_pretty(value)
        .inspect_err(|err| tracing::error!(error = %err, "Could not serialize output"))
        .ok()
}

async fn run(client: &Client, command: Command) -> Option<String> {
    match command {
        Command::Notes { citekeys } => json(&client.notes(&citekeys).await?),
        Command::Bib { citekeys, style, locale, format } => {
            let options = bibliography_options(client.bibliography_defaults(), style, locale, format);
            client.bibliography(&citekeys, &options).await
        },
        Command::Items { citekeys, library } => {
            let library = library.or_else(|| citekeys.first().map(|c| c.library))?;
            json(&client.items(&citekeys, library).await?)
        },
        Command::Relations { uris, library } => json(&client.items_by_relations(library, &uris).await?),
        Command::Collections { citekey } => json(&client.collections(&citekey).await?),
        Command::Attachments { citekey } => json(&client.attachments(&citekey).await?),
        Command::IssueDate { citekey, calendar } => json(&client.issue_date(&citekey, !calendar).await?),
        Command::Search { term } => json(&client.search(&term).await?),
        Command::Groups => json(&client.groups().await?),
        Command::Export { group_id, group_name } => json(&client.export_citekeys(group_id, &group_name).await?),
        Command::Citekeys { force } => json(&client.all_citekeys(force).await),
        Command::Library { citekey } => json(&client.library_for_citekey(&citekey).await?),
        Command::Ping => client.is_running().await.then(|| "ready".to_string()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match Config::load_from(cli.config.as_ref()) {
        Ok(config) => cli.apply(config),
        Err(err) => {
            eprintln!("zotlink: {}", *err);
            tracing::debug!(error = ?err, "Configuration failed to load");
            return ExitCode::from(MISCONFIGURED);
        },
    };
    let client = match Client::from_config(&config) {
        Ok(client) => client.with_notifier(StderrNotifier),
        Err(err) => {
            eprintln!("zotlink: {}", *err);
            tracing::debug!(error = ?err, "Could not set up the client");
            return ExitCode::from(MISCONFIGURED);
        },
    };
    tracing::debug!(endpoint = client.transport_name(), "Ready");

    match run(&client, cli.command).await {
        Some(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        },
        None => ExitCode::from(ABSENT),
    }
}
