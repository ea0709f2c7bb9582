use tokio::time::Instant;

/// Deferred write of a store: idle, or one value waiting for its deadline.
///
/// There is never more than one pending value; scheduling again replaces the
/// value and moves the deadline (trailing-edge debounce).
#[derive(Debug, Clone, PartialEq)]
pub enum PendingWrite<T> {
    Idle,
    Pending { value: T, deadline: Instant },
}

impl<T> Default for PendingWrite<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> PendingWrite<T> {
    /// Move to `Pending` with `value`. Returns true if an earlier value was dropped.
    pub fn schedule(&mut self, value: T, deadline: Instant) -> bool {
        let coalesced = self.is_pending();
        *self = Self::Pending { value, deadline };
        coalesced
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self {
            Self::Idle => None,
            Self::Pending { deadline, .. } => Some(*deadline),
        }
    }

    /// Take the value if its deadline has passed; otherwise leave the state alone.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|deadline| deadline <= now) {
            self.cancel()
        } else {
            None
        }
    }

    /// Back to `Idle`, returning the value that was waiting, if any.
    pub fn cancel(&mut self) -> Option<T> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Pending { value, .. } => Some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn reschedule_replaces_value_and_deadline() {
        let t0 = Instant::now();
        let mut p = PendingWrite::Idle;

        assert!(!p.schedule(1, t0 + Duration::from_millis(500)));
        assert!(p.schedule(2, t0 + Duration::from_millis(600)));

        assert_eq!(p.deadline(), Some(t0 + Duration::from_millis(600)));
        assert_eq!(p.take_due(t0 + Duration::from_millis(599)), None);
        assert!(p.is_pending());
        assert_eq!(p.take_due(t0 + Duration::from_millis(600)), Some(2));
        assert_eq!(p, PendingWrite::Idle);
    }

    #[test]
    fn cancel_returns_waiting_value() {
        let mut p = PendingWrite::Idle;
        assert_eq!(p.cancel(), None::<u8>);

        p.schedule(7u8, Instant::now());
        assert_eq!(p.cancel(), Some(7));
        assert_eq!(p.deadline(), None);
    }

    #[test]
    fn idle_has_nothing_due() {
        let mut p: PendingWrite<u8> = PendingWrite::default();
        assert_eq!(p.take_due(Instant::now()), None);
    }
}
