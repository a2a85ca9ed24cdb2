//! Single-slot deferred work.
//!
//! Some follow-up work is run shortly after the state change that caused it,
//! so the change itself shows up immediately. Only the latest request
//! matters: scheduling replaces whatever is still pending.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct DeferredSlot<T> {
    pending: Option<(T, Instant)>,
}

impl<T> Default for DeferredSlot<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> DeferredSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `item` to become due `delay` after `now`, returning the item it replaced.
    pub fn schedule(&mut self, item: T, now: Instant, delay: Duration) -> Option<T> {
        self.pending
            .replace((item, now + delay))
            .map(|(old, _)| old)
    }

    /// Take the pending item if it is due at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, due)) if *due <= now => self.pending.take().map(|(item, _)| item),
            _ => None,
        }
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(item, _)| item)
    }

    /// Time left until the pending item is due.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(_, due)| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_schedule_replaces_pending() {
        let now = Instant::now();
        let mut slot = DeferredSlot::new();
        assert_eq!(slot.schedule(1, now, Duration::from_millis(10)), None);
        assert_eq!(slot.schedule(2, now, Duration::from_millis(10)), Some(1));
        assert_eq!(slot.take_due(now), None);
        assert_eq!(slot.take_due(now + Duration::from_millis(10)), Some(2));
        assert!(slot.time_until_due(now).is_none());
    }
}
