use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Identifies one issued request within a [`RequestSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// One logical request slot. Only the most recently issued ticket may
/// deliver its result; late completions of older tickets are dropped.
#[derive(Debug, Clone, Default)]
pub struct RequestSlot {
    latest: Arc<AtomicU64>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestTicket {
        RequestTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    pub fn accept<T>(&self, ticket: RequestTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            debug!(
                ticket = ticket.0,
                latest = self.latest.load(Ordering::Acquire),
                "discarding superseded response"
            );
            None
        }
    }
}
