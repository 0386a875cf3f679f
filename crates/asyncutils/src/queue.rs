//! Single-flight FIFO queue.

use futures::channel::oneshot;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one queued caller.
///
/// Tickets are handed out by [`SerialQueue::ticket`] from a monotonically
/// increasing counter and are never reused. Only equality matters; the
/// counter value says nothing about admission order (a ticket issued early
/// can still join the line late).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);
impl Display for Ticket {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "#{}", self.0)
    }
}

struct Waiter {
    ticket: Ticket,
    grant: oneshot::Sender<()>,
}

#[derive(Default)]
struct State {
    running: Option<Ticket>,
    waiting: VecDeque<Waiter>,
}

/// FIFO admission gate guaranteeing at most one running ticket.
///
/// - [`wait`](Self::wait) grants the turn immediately when the queue is idle,
///   otherwise the ticket joins the back of the line.
/// - [`end`](Self::end) releases the turn and hands it to the next waiter.
///
/// The queue knows nothing about what the caller does with its turn. A
/// caller driving `wait`/`end` manually **must** call `end` before
/// propagating an error, or every later caller waits forever. Prefer
/// [`acquire`](Self::acquire), whose [`Turn`] guard calls `end` on drop.
///
/// # Examples
///
/// ```
/// use zotlink_asyncutils::SerialQueue;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let queue = SerialQueue::new();
/// {
///     let turn = queue.acquire().await;
///     assert!(queue.is_running(turn.ticket()));
///     // ... talk to the service ...
/// }
/// assert!(queue.is_idle());
/// # }
/// ```
#[derive(Default)]
pub struct SerialQueue {
    next: AtomicU64,
    state: Mutex<State>,
}

impl SerialQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh ticket. The ticket is not queued until it is passed to
    /// [`wait`](Self::wait).
    pub fn ticket(&self) -> Ticket {
        Ticket(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Resolves once it is `ticket`'s turn.
    ///
    /// Returns `true` when the turn was granted, and `false` if the ticket
    /// was withdrawn with [`end`](Self::end) while it was still waiting in
    /// line (in which case the caller holds no turn and must not act as if
    /// it did).
    pub async fn wait(&self, ticket: Ticket) -> bool {
        let granted = {
            let mut state = self.state.lock();
            match state.running {
                None => {
                    state.running = Some(ticket);
                    return true;
                },
                Some(running) if running == ticket => return true,
                Some(_) => {
                    let (grant, granted) = oneshot::channel();
                    // Waiting twice on the same ticket keeps its place in line.
                    match state.waiting.iter_mut().find(|w| w.ticket == ticket) {
                        Some(waiter) => waiter.grant = grant,
                        None => state.waiting.push_back(Waiter { ticket, grant }),
                    }
                    granted
                },
            }
        };
        tracing::trace!(%ticket, "Waiting for turn");
        // The sender is only dropped unsent when `end()` withdraws the ticket.
        granted.await.is_ok()
    }

    /// Release `ticket`'s turn and admit the next waiter.
    ///
    /// Safe to call for a ticket that never got its turn (it is withdrawn
    /// from the line and nobody else is admitted) and safe to call twice
    /// (the second call is a no-op). It never releases another ticket's turn.
    pub fn end(&self, ticket: Ticket) {
        let mut state = self.state.lock();
        if state.running != Some(ticket) {
            state.waiting.retain(|w| w.ticket != ticket);
            return;
        }
        state.running = None;
        while let Some(waiter) = state.waiting.pop_front() {
            // A waiter whose future was dropped can't take its turn, skip it.
            if waiter.grant.send(()).is_ok() {
                tracing::trace!(released = %ticket, admitted = %waiter.ticket, "Passing turn");
                state.running = Some(waiter.ticket);
                return;
            }
        }
    }

    /// Take a ticket, wait for its turn, and return a guard that ends the
    /// turn when dropped.
    ///
    /// Dropping the returned future before it resolves withdraws the ticket
    /// from the line, so cancellation never leaves the queue wedged.
    pub async fn acquire(&self) -> Turn<'_> {
        let turn = Turn { queue: self, ticket: self.ticket() };
        // Can't be withdrawn: nobody else knows this ticket.
        self.wait(turn.ticket).await;
        turn
    }

    /// Returns `true` if `ticket` currently holds the turn.
    pub fn is_running(&self, ticket: Ticket) -> bool {
        self.state.lock().running == Some(ticket)
    }

    /// Returns `true` if nobody holds the turn.
    pub fn is_idle(&self) -> bool {
        self.state.lock().running.is_none()
    }

    /// Number of tickets waiting in line (excluding the running one).
    pub fn waiting(&self) -> usize {
        self.state.lock().waiting.len()
    }
}

/// The running turn of a [`SerialQueue`]; released on drop.
pub struct Turn<'a> {
    queue: &'a SerialQueue,
    ticket: Ticket,
}
impl Turn<'_> {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }
}
impl Drop for Turn<'_> {
    fn drop(&mut self) {
        self.queue.end(self.ticket);
    }
}
