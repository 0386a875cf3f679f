//! Scripted transport for testing.

use crate::Transport;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A request observed by a [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Rpc { method: String, params: Value },
    Get { path: String },
}

#[derive(Debug, Clone)]
enum Reply {
    Body(String),
    Fail(ErrorKind),
}

/// Transport that answers from a script instead of the network.
///
/// Replies are registered per JSON-RPC method (or per GET path) and consumed
/// in order; the last reply registered for a key keeps being returned once
/// the others are used up. A request without any scripted reply fails with
/// [`ErrorKind::Connection`], just like talking to a service that isn't
/// running.
///
/// Every request yields to the runtime while "in flight", and the mock
/// records the highest number of requests it ever saw in flight at once.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use zotlink_transport::{MockTransport, Transport};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let transport = MockTransport::default();
/// transport.on_rpc("user.groups", r#"{"result": [{"id": 1, "name": "My Library"}]}"#);
/// let body = transport.rpc("user.groups", &json!([])).await.unwrap();
/// assert!(body.contains("My Library"));
/// assert_eq!(transport.rpc_count("user.groups"), 1);
/// # }
/// ```
#[derive(Debug)]
pub struct MockTransport {
    name: String,
    rpc: Mutex<HashMap<String, VecDeque<Reply>>>,
    get: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}
impl Default for MockTransport {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            rpc: Mutex::default(),
            get: Mutex::default(),
            calls: Mutex::default(),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

impl MockTransport {
    /// Change the name of the mock transport.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Script a response body for a JSON-RPC method.
    pub fn on_rpc(&self, method: impl Into<String>, body: impl Into<String>) -> &Self {
        self.rpc.lock().entry(method.into()).or_default().push_back(Reply::Body(body.into()));
        self
    }

    /// Script a transport failure for a JSON-RPC method.
    pub fn fail_rpc(&self, method: impl Into<String>, kind: ErrorKind) -> &Self {
        self.rpc.lock().entry(method.into()).or_default().push_back(Reply::Fail(kind));
        self
    }

    /// Script a response body for a GET request.
    pub fn on_get(&self, path: impl Into<String>, body: impl Into<String>) -> &Self {
        self.get.lock().entry(path.into()).or_default().push_back(Reply::Body(body.into()));
        self
    }

    /// Script a transport failure for a GET request.
    pub fn fail_get(&self, path: impl Into<String>, kind: ErrorKind) -> &Self {
        self.get.lock().entry(path.into()).or_default().push_back(Reply::Fail(kind));
        self
    }

    /// Every request seen so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Number of requests made for a JSON-RPC method.
    pub fn rpc_count(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|c| matches!(c, Call::Rpc { method: m, .. } if m == method)).count()
    }

    /// Number of GET requests made for a path.
    pub fn get_count(&self, path: &str) -> usize {
        self.calls.lock().iter().filter(|c| matches!(c, Call::Get { path: p } if p == path)).count()
    }

    /// Highest number of requests that were ever in flight at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn next(script: &Mutex<HashMap<String, VecDeque<Reply>>>, key: &str) -> Option<Reply> {
        let mut guard = script.lock();
        let replies = guard.get_mut(key)?;
        if replies.len() > 1 { replies.pop_front() } else { replies.front().cloned() }
    }

    async fn respond(&self, call: Call, reply: Option<Reply>, key: &str) -> Result<String> {
        self.calls.lock().push(call);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        // Give every other task a chance to run while this request is "on the wire".
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match reply {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Fail(kind)) => Err(exn::Exn::from(kind)),
            None => Err(exn::Exn::from(ErrorKind::Connection(format!("{} (nothing scripted for {key})", self.name)))),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn rpc(&self, method: &str, params: &Value) -> Result<String> {
        let reply = Self::next(&self.rpc, method);
        let call = Call::Rpc { method: method.to_string(), params: params.clone() };
        self.respond(call, reply, method).await
    }

    async fn get(&self, path_and_query: &str) -> Result<String> {
        let reply = Self::next(&self.get, path_and_query);
        let call = Call::Get { path: path_and_query.to_string() };
        self.respond(call, reply, path_and_query).await
    }
}
