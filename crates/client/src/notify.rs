//! How the client talks back to whoever is driving it.

use std::sync::Arc;

/// Receives user-facing feedback from the client.
///
/// `busy` brackets every remote call, `notice` carries a message for every
/// operation that failed. Both are called from whichever task is running the
/// operation, so implementations must be cheap and must not block.
pub trait Notifier: Send + Sync {
    fn busy(&self, _busy: bool) {}
    fn notice(&self, message: &str);
}

pub type NotifierHandle = Arc<dyn Notifier>;

/// Emits notices as `tracing` events. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;
impl Notifier for TracingNotifier {
    fn busy(&self, busy: bool) {
        tracing::trace!(busy, "Busy");
    }

    fn notice(&self, message: &str) {
        tracing::info!(notice = message);
    }
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;
impl Notifier for SilentNotifier {
    fn notice(&self, _message: &str) {}
}

/// Reports busy while alive, and idle again when dropped (even if the future
/// holding it is cancelled).
pub(crate) struct Busy<'a>(&'a dyn Notifier);
impl<'a> Busy<'a> {
    pub(crate) fn start(notifier: &'a dyn Notifier) -> Self {
        notifier.busy(true);
        Self(notifier)
    }
}
impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.busy(false);
    }
}
