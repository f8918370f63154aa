//! Cast-lock and weave window tracking
//!
//! Records when the last action and the last cast-locked action went
//! through, and answers the timing questions the opener and selector ask.
//! An action that never happened counts as infinitely long ago, so a fresh
//! tracker imposes no lockout.

use std::time::Duration;

use crate::actions::catalog::SlotKind;
use crate::core::clock::Timestamp;
use crate::core::config::TimingConfig;

#[derive(Debug, Clone)]
pub struct TimingTracker {
    last_action_at: Option<Timestamp>,
    last_cast_locked_at: Option<Timestamp>,
    recovery: Duration,
    weave_start: Duration,
    weave_end: Duration,
    instant_lockout: Duration,
}

impl TimingTracker {
    pub fn new(config: &TimingConfig) -> Self {
        Self {
            last_action_at: None,
            last_cast_locked_at: None,
            recovery: config.recovery(),
            weave_start: config.weave_start(),
            weave_end: config.weave_end(),
            instant_lockout: config.instant_lock(),
        }
    }

    /// Forget both timestamps
    pub fn reset(&mut self) {
        self.last_action_at = None;
        self.last_cast_locked_at = None;
    }

    pub fn elapsed_since_action(&self, now: Timestamp) -> Duration {
        elapsed(self.last_action_at, now)
    }

    pub fn elapsed_since_cast_locked(&self, now: Timestamp) -> Duration {
        elapsed(self.last_cast_locked_at, now)
    }

    /// Inside `[weave_min, recovery_period - weave_margin)` after the last
    /// cast-locked action
    pub fn in_weave_window(&self, now: Timestamp) -> bool {
        if self.last_cast_locked_at.is_none() {
            return false;
        }
        let since = self.elapsed_since_cast_locked(now);
        since >= self.weave_start && since < self.weave_end
    }

    /// The shared recovery timer has run out
    pub fn cast_locked_ready(&self, now: Timestamp) -> bool {
        self.elapsed_since_cast_locked(now) >= self.recovery
    }

    /// Enough spacing since the previous action for an instant
    pub fn instant_ready(&self, now: Timestamp) -> bool {
        self.elapsed_since_action(now) >= self.instant_lockout
    }

    pub fn slot_ready(&self, slot: SlotKind, now: Timestamp) -> bool {
        match slot {
            SlotKind::CastLocked => self.cast_locked_ready(now),
            SlotKind::Instant => self.instant_ready(now),
        }
    }

    /// An instant may be woven right now
    pub fn can_weave(&self, now: Timestamp) -> bool {
        self.in_weave_window(now) && self.instant_ready(now)
    }

    /// Record a successful invocation
    pub fn record(&mut self, slot: SlotKind, now: Timestamp) {
        self.last_action_at = Some(now);
        if slot == SlotKind::CastLocked {
            self.last_cast_locked_at = Some(now);
        }
    }

    /// Seconds until the recovery timer runs out, zero when ready
    pub fn recovery_remaining(&self, now: Timestamp) -> Duration {
        self.recovery
            .saturating_sub(self.elapsed_since_cast_locked(now))
    }
}

fn elapsed(at: Option<Timestamp>, now: Timestamp) -> Duration {
    match at {
        Some(at) => now.since(at),
        None => Duration::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> TimingTracker {
        TimingTracker::new(&TimingConfig::default())
    }

    fn at(millis: u64) -> Timestamp {
        Timestamp::from_millis(millis)
    }

    #[test]
    fn test_fresh_tracker_has_no_lockout() {
        let timing = tracker();
        assert!(timing.cast_locked_ready(at(0)));
        assert!(timing.instant_ready(at(0)));
        assert!(!timing.in_weave_window(at(0)));
        assert_eq!(timing.elapsed_since_action(at(0)), Duration::MAX);
    }

    #[test]
    fn test_weave_window_bounds() {
        let mut timing = tracker();
        timing.record(SlotKind::CastLocked, at(1000));

        assert!(!timing.in_weave_window(at(1500)));
        assert!(timing.in_weave_window(at(1600)));
        assert!(timing.in_weave_window(at(2999)));
        assert!(!timing.in_weave_window(at(3000)));
        assert!(!timing.in_weave_window(at(3600)));
    }

    #[test]
    fn test_cast_lock_recovery() {
        let mut timing = tracker();
        timing.record(SlotKind::CastLocked, at(0));
        assert!(!timing.cast_locked_ready(at(2499)));
        assert!(timing.cast_locked_ready(at(2500)));
        assert_eq!(timing.recovery_remaining(at(2000)), Duration::from_millis(500));
        assert_eq!(timing.recovery_remaining(at(4000)), Duration::ZERO);
    }

    #[test]
    fn test_instant_does_not_touch_cast_lock() {
        let mut timing = tracker();
        timing.record(SlotKind::CastLocked, at(0));
        timing.record(SlotKind::Instant, at(700));

        assert_eq!(timing.elapsed_since_cast_locked(at(1000)), Duration::from_millis(1000));
        assert_eq!(timing.elapsed_since_action(at(1000)), Duration::from_millis(300));
        assert!(timing.in_weave_window(at(1000)));
        assert!(!timing.can_weave(at(1000)));
        assert!(timing.can_weave(at(1300)));
    }

    #[test]
    fn test_reset_backdates() {
        let mut timing = tracker();
        timing.record(SlotKind::CastLocked, at(0));
        timing.reset();
        assert!(timing.cast_locked_ready(at(10)));
        assert!(timing.instant_ready(at(10)));
    }

    #[test]
    fn test_slot_ready_dispatch() {
        let mut timing = tracker();
        timing.record(SlotKind::CastLocked, at(0));
        assert!(timing.slot_ready(SlotKind::Instant, at(600)));
        assert!(!timing.slot_ready(SlotKind::CastLocked, at(600)));
    }
}
