pub mod backend;
pub mod error;
mod request;

#[cfg(any(test, feature = "mock"))]
pub use crate::backend::{Call, MockTransport};
pub use crate::backend::{HttpTransport, Transport};
pub use crate::request::{RPC_PATH, RpcRequest};
use std::sync::Arc;

pub type TransportHandle = Arc<dyn Transport + Send + Sync>;
