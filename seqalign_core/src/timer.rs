use std::time::{Duration, Instant};
use tracing::debug;

/// Identifies one scheduled clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingClear {
    handle: TimerHandle,
    deadline: Instant,
}

/// Single-slot deferred callback. Scheduling always cancels whatever was
/// pending, so at most one clear is ever outstanding.
#[derive(Debug, Default)]
pub struct ConfirmationTimer {
    pending: Option<PendingClear>,
    next_handle: u64,
}

impl ConfirmationTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration) -> TimerHandle {
        self.cancel();
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending = Some(PendingClear {
            handle,
            deadline: now + delay,
        });
        debug!(handle = handle.0, ?delay, "Confirmation clear scheduled");
        handle
    }

    /// Drop the pending clear, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                debug!(handle = pending.handle.0, "Confirmation clear cancelled");
                true
            }
            None => false,
        }
    }

    /// Fire the pending clear once its deadline has passed
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(pending) if now >= pending.deadline => {
                self.pending = None;
                debug!(handle = pending.handle.0, "Confirmation clear fired");
                true
            }
            _ => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|pending| pending.deadline)
    }

    pub fn pending_handle(&self) -> Option<TimerHandle> {
        self.pending.map(|pending| pending.handle)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
