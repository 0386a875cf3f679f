//! HTTP transport backed by [`reqwest`].

use crate::Transport;
use crate::error::{ErrorKind, Result};
use crate::request::{RPC_PATH, RpcRequest};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::instrument;

/// Talks to a Better BibTeX service on `127.0.0.1:<port>`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    name: String,
    base: Url,
    client: Client,
}

impl HttpTransport {
    /// Create a transport for the service listening on `port`.
    ///
    /// `timeout` applies to each request as a whole (connect, send and read).
    pub fn new(port: u16, timeout: Duration) -> Result<Self> {
        let authority = format!("127.0.0.1:{port}");
        let base = Url::parse(&format!("http://{authority}/")).or_raise(|| ErrorKind::InvalidUrl(authority.clone()))?;
        let client = Client::builder().timeout(timeout).build().map_err(ErrorKind::http)?;
        Ok(Self { name: authority, base, client })
    }

    /// Change the name used in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn url(&self, path_and_query: &str) -> Result<Url> {
        self.base
            .join(path_and_query.trim_start_matches('/'))
            .or_raise(|| ErrorKind::InvalidUrl(path_and_query.to_string()))
    }

    async fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = request.send().await.map_err(ErrorKind::http)?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }
        response.text().await.map_err(ErrorKind::http)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, params), fields(endpoint = %self.name))]
    async fn rpc(&self, method: &str, params: &Value) -> Result<String> {
        let request = self
            .client
            .post(self.url(RPC_PATH)?)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(&RpcRequest::new(method, params));
        let body = self.send(request).await?;
        tracing::trace!(bytes = body.len(), "Received JSON-RPC response");
        Ok(body)
    }

    #[instrument(skip(self), fields(endpoint = %self.name))]
    async fn get(&self, path_and_query: &str) -> Result<String> {
        let body = self.send(self.client.get(self.url(path_and_query)?)).await?;
        tracing::trace!(bytes = body.len(), "Received response");
        Ok(body)
    }
}
