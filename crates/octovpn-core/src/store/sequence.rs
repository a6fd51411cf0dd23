// ── Request sequencing ──
//
// Monotonic tickets so a slow response for an old request can never
// overwrite the result of a newer one. Only responses that were actually
// applied count: a newer request that fails leaves older ones eligible.

use std::sync::atomic::{AtomicU64, Ordering};

/// Issued per request, ordered by issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Hands out tickets for one dependent slot (e.g. the locations store).
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request.
    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// `true` if no newer ticket has been issued since `ticket`.
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Claim the slot for `ticket`. Succeeds unless a newer ticket's
    /// response was already applied.
    pub fn try_apply(&self, ticket: Ticket) -> bool {
        self.applied
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |applied| {
                (ticket.0 > applied).then_some(ticket.0)
            })
            .is_ok()
    }
}
