use crate::error::{ErrorKind, Result};
use crate::notify::{Busy, Notifier, NotifierHandle, TracingNotifier};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;
use zotlink_asyncutils::SerialQueue;
use zotlink_cache::Caches;
use zotlink_config::{BibliographyConfig, Config};
use zotlink_protocol::parse_result;
use zotlink_transport::{HttpTransport, TransportHandle};

/// A session with one Better BibTeX service.
///
/// Every public operation is queued behind all others, so no matter how many
/// tasks share a client, the service only ever sees one request at a time.
/// Operations never fail: anything that goes wrong is logged, reported to
/// the [`Notifier`], and the operation returns `None`.
///
/// # Examples
///
/// ```no_run
/// use zotlink_client::Client;
/// use zotlink_config::Config;
/// use zotlink_protocol::models::CiteKey;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let client = Client::from_config(&Config::load().unwrap()).unwrap();
/// if let Some(paths) = client.collections(&CiteKey::new("doe2020", 1)).await {
///     for path in paths {
///         println!("{}", path.full_path);
///     }
/// }
/// # }
/// ```
pub struct Client {
    pub(crate) transport: TransportHandle,
    pub(crate) queue: SerialQueue,
    pub(crate) caches: Caches,
    pub(crate) notifier: NotifierHandle,
    pub(crate) bibliography: BibliographyConfig,
}

impl Client {
    pub fn new(transport: TransportHandle) -> Self {
        Self {
            transport,
            queue: SerialQueue::new(),
            caches: Caches::new(),
            notifier: Arc::new(TracingNotifier),
            bibliography: BibliographyConfig::default(),
        }
    }

    /// Connect over HTTP to the service `config` points at.
    ///
    /// Fails when the configured database has no port to talk to.
    pub fn from_config(config: &Config) -> Result<Self> {
        let port = config.port().map_err(ErrorKind::config)?;
        let transport = HttpTransport::new(port, config.request_timeout())
            .map_err(ErrorKind::transport)?
            .with_name(format!("{} on 127.0.0.1:{port}", config.database));
        Ok(Self::new(Arc::new(transport)).with_bibliography(config.bibliography.clone()))
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Defaults for bibliographies rendered through the CLI.
    pub fn with_bibliography(mut self, bibliography: BibliographyConfig) -> Self {
        self.bibliography = bibliography;
        self
    }

    pub fn bibliography_defaults(&self) -> &BibliographyConfig {
        &self.bibliography
    }

    pub fn caches(&self) -> &Caches {
        &self.caches
    }

    pub fn queue(&self) -> &SerialQueue {
        &self.queue
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Send one JSON-RPC request once it's this caller's turn, and return the
    /// raw body. The turn is over as soon as the body has arrived.
    #[instrument(level = "debug", skip(self, params))]
    pub(crate) async fn request(&self, method: &str, params: Value) -> Result<String> {
        let turn = self.queue.acquire().await;
        let _busy = Busy::start(&*self.notifier);
        tracing::trace!(ticket = %turn.ticket(), "Admitted");
        self.transport.rpc(method, &params).await.map_err(ErrorKind::transport)
    }

    /// Queued GET, for the endpoints that aren't JSON-RPC.
    #[instrument(level = "debug", skip(self))]
    pub(crate) async fn fetch(&self, path_and_query: &str) -> Result<String> {
        let turn = self.queue.acquire().await;
        let _busy = Busy::start(&*self.notifier);
        tracing::trace!(ticket = %turn.ticket(), "Admitted");
        self.transport.get(path_and_query).await.map_err(ErrorKind::transport)
    }

    /// [`Client::request`], then unwrap the JSON-RPC envelope.
    pub(crate) async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let body = self.request(method, params).await?;
        parse_result(&body).map_err(ErrorKind::protocol)
    }

    /// The one place an operation's failure turns into absence.
    pub(crate) fn settle<T>(&self, operation: &'static str, result: Result<Option<T>>) -> Option<T> {
        match result {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(operation, error = ?err, "Operation failed");
                self.notifier.notice(&(*err).to_string());
                None
            },
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.transport.name())
            .field("waiting", &self.queue.waiting())
            .field("caches", &self.caches)
            .finish_non_exhaustive()
    }
}
