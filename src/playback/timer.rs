//! Timer collaborators.
//!
//! A timer never blocks. `schedule` registers a one-shot wake that the host
//! later hands back to [`Player::on_wake`](super::Player::on_wake); the wake
//! carries the run generation and step sequence it was issued for, so a wake
//! that outlives a `stop()` or `start()` is recognized and dropped.

use std::time::Duration;

/// Tagged continuation delivered back to the player when a wait elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wake {
    pub generation: u64,
    pub sequence: u64,
}

pub trait Timer {
    /// Deliver `wake` no earlier than `delay` from now, replacing any
    /// registration that has not fired yet.
    fn schedule(&mut self, delay: Duration, wake: Wake);

    /// Drop the pending registration, if any.
    fn cancel(&mut self);
}

/// Virtual-time timer: nothing fires until [`ManualTimer::fire`] is called,
/// which jumps the clock to the pending deadline.
#[derive(Debug, Default)]
pub struct ManualTimer {
    now: Duration,
    pending: Option<(Duration, Wake)>,
    scheduled: usize,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Deadline and wake of the pending registration
    pub fn pending(&self) -> Option<(Duration, Wake)> {
        self.pending
    }

    /// Total number of registrations made
    pub fn scheduled(&self) -> usize {
        self.scheduled
    }

    /// Advance to the pending deadline and hand back its wake.
    pub fn fire(&mut self) -> Option<Wake> {
        let (deadline, wake) = self.pending.take()?;
        self.now = deadline;
        Some(wake)
    }
}

impl Timer for ManualTimer {
    fn schedule(&mut self, delay: Duration, wake: Wake) {
        self.pending = Some((self.now + delay, wake));
        self.scheduled += 1;
    }

    fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_advances_clock() {
        let mut timer = ManualTimer::new();
        let wake = Wake { generation: 1, sequence: 1 };
        timer.schedule(Duration::from_millis(250), wake);
        assert_eq!(timer.pending(), Some((Duration::from_millis(250), wake)));
        assert_eq!(timer.fire(), Some(wake));
        assert_eq!(timer.now(), Duration::from_millis(250));
        assert_eq!(timer.fire(), None);
    }

    #[test]
    fn test_cancel_and_replace() {
        let mut timer = ManualTimer::new();
        timer.schedule(Duration::from_millis(10), Wake { generation: 1, sequence: 1 });
        timer.schedule(Duration::from_millis(20), Wake { generation: 1, sequence: 2 });
        assert_eq!(timer.pending().map(|(_, w)| w.sequence), Some(2));
        timer.cancel();
        assert_eq!(timer.fire(), None);
        assert_eq!(timer.now(), Duration::ZERO);
        assert_eq!(timer.scheduled(), 2);
    }
}
