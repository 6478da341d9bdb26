use std::sync::atomic::{AtomicU64, Ordering};

/// Ticket taken when a fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Monotonic per-resource counter used to drop superseded responses.
///
/// Each fetch takes a ticket before it is issued. When the response arrives
/// it is applied only if no newer ticket has been handed out since.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    latest: AtomicU64,
}

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// Outcome of a fetch that completed successfully.
#[derive(Debug, Clone, PartialEq)]
pub enum Synced<T> {
    Applied(T),
    /// A newer fetch for the same resource started first; the response was dropped.
    Superseded,
}

impl<T> Synced<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Synced::Applied(value) => Some(value),
            Synced::Superseded => None,
        }
    }

    #[cfg(test)]
    pub fn is_superseded(&self) -> bool {
        matches!(self, Synced::Superseded)
    }
}
