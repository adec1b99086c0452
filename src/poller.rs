//! Fixed-interval sampling of the widget clock.
//!
//! The poller owns no thread. The event loop asks it for its next deadline
//! and calls `poll` with the current instant; a sample is taken at most once
//! per interval while the poller runs.

use std::time::{Duration, Instant};

/// One reading of the widget clock, in seconds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sample {
    pub position: f64,
    pub duration: f64,
}

impl Sample {
    /// Only strictly positive, finite readings are published. A widget in
    /// transition reads `0` and must not rewind the timeline.
    pub fn is_publishable(&self) -> bool {
        self.position.is_finite()
            && self.duration.is_finite()
            && self.position > 0.0
            && self.duration > 0.0
    }

    /// Position as a percentage of the duration, clamped to `0..=100`.
    pub fn progress(&self) -> f64 {
        if !self.is_publishable() {
            return 0.0;
        }
        (self.position / self.duration * 100.0).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone)]
pub struct TimeSyncPoller {
    interval: Duration,
    next_due: Option<Instant>,
}

impl TimeSyncPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    /// Begin sampling; the first sample is due one interval after `now`.
    /// Restarting a running poller keeps its schedule.
    pub fn start(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now + self.interval);
        }
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_due
    }

    /// Take a sample through `read` if one is due.
    ///
    /// Missed ticks are not replayed: after a late call the next sample is
    /// due one interval from `now`. Unreadable and unpublishable samples are
    /// dropped.
    pub fn poll<F>(&mut self, now: Instant, read: F) -> Option<Sample>
    where
        F: FnOnce() -> Option<Sample>,
    {
        let due = self.next_due?;
        if now < due {
            return None;
        }
        let mut next = due + self.interval;
        if next <= now {
            next = now + self.interval;
        }
        self.next_due = Some(next);

        read().filter(Sample::is_publishable)
    }
}
