// ── Cancellable debounce slot ──
//
// Holds at most one pending delayed write. Scheduling a new write or
// firing one immediately supersedes whatever was pending: last event wins.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::trace;

#[derive(Default)]
struct SlotState {
    generation: u64,
    pending: Option<CancellationToken>,
}

/// A single debounced write target.
///
/// A timer claims the slot under the lock and writes after releasing it,
/// so write closures may re-enter the slot.
#[derive(Default)]
pub struct DebounceSlot {
    state: Mutex<SlotState>,
}

impl DebounceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a delayed write, cancelling any pending one.
    ///
    /// Returns the timer future; the caller decides where to spawn it.
    pub fn schedule<F>(
        self: &Arc<Self>,
        delay: Duration,
        write: F,
    ) -> impl Future<Output = ()> + Send + 'static
    where
        F: FnOnce() + Send + 'static,
    {
        let (generation, token) = {
            let mut state = self.lock();
            state.generation += 1;
            if let Some(old) = state.pending.take() {
                old.cancel();
            }
            let token = CancellationToken::new();
            state.pending = Some(token.clone());
            (state.generation, token)
        };
        let deadline = tokio::time::Instant::now() + delay;
        trace!(generation, ?delay, "debounced write scheduled");

        let slot = Arc::clone(self);
        async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {
                    trace!(generation, "debounced write superseded");
                }
                () = tokio::time::sleep_until(deadline) => {
                    if slot.claim(generation) {
                        write();
                    } else {
                        trace!(generation, "debounced write superseded");
                    }
                }
            }
        }
    }

    /// Cancel any pending write and perform `write` now.
    pub fn fire_now<F: FnOnce()>(&self, write: F) {
        self.cancel();
        write();
    }

    /// Drop any pending write without replacing it.
    pub fn cancel(&self) {
        let mut state = self.lock();
        state.generation += 1;
        if let Some(old) = state.pending.take() {
            old.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending.is_some()
    }

    /// Take the slot for the timer of `generation` if nothing superseded it.
    fn claim(&self, generation: u64) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            return false;
        }
        state.pending = None;
        true
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
