use std::time::Instant;

use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// A deadline holding at most one pending payload.
///
/// Arming replaces whatever was pending. The slot is passive: callers poll it
/// with [`TimerSlot::fire`] and use [`TimerSlot::deadline`] to schedule the
/// next wake-up, so dropping or cancelling it can never leave a callback
/// behind.
#[derive(Debug)]
pub struct TimerSlot<T> {
    next_id: u64,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    id: TimerId,
    deadline: Instant,
    payload: T,
}

impl<T> Default for TimerSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerSlot<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: None,
        }
    }

    pub fn arm(&mut self, deadline: Instant, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        if let Some(previous) = self.pending.replace(Pending {
            id,
            deadline,
            payload,
        }) {
            trace!(replaced = previous.id.0, armed = id.0, "timer re-armed");
        }
        id
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.payload)
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_id(&self) -> Option<TimerId> {
        self.pending.as_ref().map(|pending| pending.id)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    /// Takes the payload once its deadline has passed.
    pub fn fire(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(pending) if pending.deadline <= now => self.cancel(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fires_only_after_deadline() {
        let start = Instant::now();
        let mut slot = TimerSlot::new();
        slot.arm(start + Duration::from_millis(10), "payload");

        assert_eq!(slot.fire(start + Duration::from_millis(9)), None);
        assert_eq!(slot.fire(start + Duration::from_millis(10)), Some("payload"));
        assert!(!slot.is_armed());
    }

    #[test]
    fn fires_at_most_once() {
        let start = Instant::now();
        let mut slot = TimerSlot::new();
        slot.arm(start, 1);

        assert_eq!(slot.fire(start), Some(1));
        assert_eq!(slot.fire(start + Duration::from_secs(1)), None);
    }

    #[test]
    fn arming_replaces_pending_payload() {
        let start = Instant::now();
        let mut slot = TimerSlot::new();
        let first = slot.arm(start + Duration::from_millis(5), "first");
        let second = slot.arm(start + Duration::from_millis(20), "second");

        assert_ne!(first, second);
        assert_eq!(slot.pending_id(), Some(second));
        assert_eq!(slot.fire(start + Duration::from_millis(5)), None);
        assert_eq!(slot.fire(start + Duration::from_millis(20)), Some("second"));
    }

    #[test]
    fn cancel_clears_deadline() {
        let start = Instant::now();
        let mut slot = TimerSlot::new();
        slot.arm(start, ());

        assert_eq!(slot.cancel(), Some(()));
        assert_eq!(slot.deadline(), None);
        assert_eq!(slot.fire(start), None);
    }
}
