//! Deferred callbacks for the finale.
//!
//! The director never sleeps. Delays (settle pause before a spawn, end of a
//! hit pulse) are queued with a due time and the run they belong to, then
//! handed back by [`DeferredQueue::take_due`] on the first tick at or after
//! that time.

use crate::events::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Spawn the next wave foe or boss.
    SpawnNext,
    /// Turn off the hit pulse on one side.
    EndHitPulse(Side),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deferred {
    pub due_at: u64,
    /// Run that scheduled the callback; stale runs are ignored on fire.
    pub run_id: u64,
    pub action: DeferredAction,
}

#[derive(Debug, Clone, Default)]
pub struct DeferredQueue {
    pending: Vec<Deferred>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_at: u64, run_id: u64, action: DeferredAction) {
        self.pending.push(Deferred {
            due_at,
            run_id,
            action,
        });
    }

    /// Remove and return every callback due at `now`, earliest first.
    /// Callbacks with the same due time keep their scheduling order.
    pub fn take_due(&mut self, now: u64) -> Vec<Deferred> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|d| d.due_at <= now);
        self.pending = pending;
        due.sort_by_key(|d| d.due_at);
        due
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_due_in_order() {
        let mut queue = DeferredQueue::new();
        queue.schedule(300, 1, DeferredAction::EndHitPulse(Side::Foe));
        queue.schedule(100, 1, DeferredAction::SpawnNext);
        queue.schedule(900, 1, DeferredAction::EndHitPulse(Side::Hero));

        assert!(queue.take_due(50).is_empty());

        let due = queue.take_due(300);
        let actions: Vec<_> = due.iter().map(|d| d.action).collect();
        assert_eq!(
            actions,
            vec![
                DeferredAction::SpawnNext,
                DeferredAction::EndHitPulse(Side::Foe)
            ]
        );
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_cancel_all() {
        let mut queue = DeferredQueue::new();
        queue.schedule(10, 1, DeferredAction::SpawnNext);
        queue.cancel_all();
        queue.cancel_all();
        assert!(queue.is_empty());
        assert!(queue.take_due(u64::MAX).is_empty());
    }
}
