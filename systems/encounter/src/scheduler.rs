//! One-shot countdown that can hold back a single action.

use std::time::Duration;

/// Countdown that parks at most one action until it elapses.
///
/// Time only moves through [`DeferredAction::advance`], so the countdown is
/// fully driven by the caller's frame durations.
#[derive(Clone, Debug)]
pub struct DeferredAction<A> {
    remaining: Option<Duration>,
    parked: Option<A>,
}

impl<A> DeferredAction<A> {
    /// Creates a disarmed scheduler with nothing parked.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            remaining: None,
            parked: None,
        }
    }

    /// Starts the countdown, restarting it if it was already running.
    pub fn arm(&mut self, delay: Duration) {
        self.remaining = Some(delay);
    }

    /// Parks `action` unless another action is already parked.
    ///
    /// Returns `false` when the action was absorbed by the parked one.
    pub fn defer(&mut self, action: A) -> bool {
        if self.parked.is_some() {
            return false;
        }
        self.parked = Some(action);
        true
    }

    /// Counts down by `dt`, yielding the parked action once the countdown ends.
    ///
    /// The scheduler disarms itself when the countdown ends, whether or not an
    /// action was parked.
    pub fn advance(&mut self, dt: Duration) -> Option<A> {
        let remaining = self.remaining?;
        if dt < remaining {
            self.remaining = Some(remaining - dt);
            return None;
        }

        self.remaining = None;
        self.parked.take()
    }

    /// Disarms the countdown and drops any parked action.
    pub fn cancel(&mut self) {
        self.remaining = None;
        self.parked = None;
    }

    /// Reports whether the countdown is running.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Reports whether an action is waiting for the countdown.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.parked.is_some()
    }
}

impl<A> Default for DeferredAction<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_parked_action_once_elapsed() {
        let mut scheduler = DeferredAction::new();
        scheduler.arm(Duration::from_millis(300));
        assert!(scheduler.defer('d'));

        assert_eq!(scheduler.advance(Duration::from_millis(299)), None);
        assert_eq!(scheduler.advance(Duration::from_millis(1)), Some('d'));
        assert!(!scheduler.is_armed());
        assert_eq!(scheduler.advance(Duration::from_secs(5)), None);
    }

    #[test]
    fn second_action_is_absorbed() {
        let mut scheduler = DeferredAction::new();
        scheduler.arm(Duration::from_millis(100));

        assert!(scheduler.defer(1));
        assert!(!scheduler.defer(2));
        assert_eq!(scheduler.advance(Duration::from_millis(100)), Some(1));
    }

    #[test]
    fn rearming_restarts_countdown() {
        let mut scheduler = DeferredAction::new();
        scheduler.arm(Duration::from_millis(300));
        assert!(scheduler.defer(()));
        assert_eq!(scheduler.advance(Duration::from_millis(200)), None);

        scheduler.arm(Duration::from_millis(300));

        assert_eq!(scheduler.advance(Duration::from_millis(200)), None);
        assert_eq!(scheduler.advance(Duration::from_millis(100)), Some(()));
    }

    #[test]
    fn elapsing_without_action_disarms() {
        let mut scheduler: DeferredAction<u8> = DeferredAction::new();
        scheduler.arm(Duration::from_millis(50));

        assert_eq!(scheduler.advance(Duration::from_millis(80)), None);
        assert!(!scheduler.is_armed());
    }

    #[test]
    fn cancel_drops_parked_action() {
        let mut scheduler = DeferredAction::new();
        scheduler.arm(Duration::from_millis(50));
        assert!(scheduler.defer("descend"));

        scheduler.cancel();

        assert!(!scheduler.is_armed());
        assert!(!scheduler.is_pending());
        assert_eq!(scheduler.advance(Duration::from_secs(1)), None);
    }
}
