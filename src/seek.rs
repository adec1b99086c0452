//! Pointer-driven seeking and the settle window that follows it.
//!
//! After a seek the widget keeps reporting its old position for a moment.
//! `SeekCoordinator` remembers the target until a deadline so the caller can
//! discard poll samples that would snap the timeline back.

use std::time::{Duration, Instant};

/// Map a pointer x coordinate on a bar starting at `left` with `width` to a
/// `0.0..=1.0` ratio. A zero-width bar maps everything to `0.0`.
pub fn ratio_from_pointer(x: f64, left: f64, width: f64) -> f64 {
    if width.is_nan() || width <= 0.0 || !x.is_finite() || !left.is_finite() {
        return 0.0;
    }
    ((x - left) / width).clamp(0.0, 1.0)
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct PendingSeek {
    target: f64,
    until: Instant,
}

#[derive(Debug, Clone)]
pub struct SeekCoordinator {
    settle: Duration,
    pending: Option<PendingSeek>,
}

impl SeekCoordinator {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            pending: None,
        }
    }

    /// Start a seek to `ratio` of `duration` seconds, returning the target.
    ///
    /// Nothing happens without a known duration. A new seek replaces any
    /// pending one and restarts the settle window.
    pub fn begin(&mut self, ratio: f64, duration: f64, now: Instant) -> Option<f64> {
        if !duration.is_finite() || duration <= 0.0 {
            return None;
        }
        let ratio = if ratio.is_nan() {
            0.0
        } else {
            ratio.clamp(0.0, 1.0)
        };
        let target = ratio * duration;
        self.pending = Some(PendingSeek {
            target,
            until: now + self.settle,
        });
        Some(target)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn target(&self) -> Option<f64> {
        self.pending.map(|p| p.target)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.until)
    }

    /// Clear the pending seek once its window has passed. Returns `true`
    /// when it was cleared by this call.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(p) if now >= p.until => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_ratio_is_clamped() {
        assert_eq!(ratio_from_pointer(150.0, 100.0, 200.0), 0.25);
        assert_eq!(ratio_from_pointer(50.0, 100.0, 200.0), 0.0);
        assert_eq!(ratio_from_pointer(400.0, 100.0, 200.0), 1.0);
        assert_eq!(ratio_from_pointer(150.0, 100.0, 0.0), 0.0);
    }

    #[test]
    fn begin_requires_known_duration() {
        let now = Instant::now();
        let mut seek = SeekCoordinator::new(Duration::from_millis(150));
        assert_eq!(seek.begin(0.5, 0.0, now), None);
        assert_eq!(seek.begin(0.5, f64::NAN, now), None);
        assert!(!seek.is_pending());
    }

    #[test]
    fn window_expires_after_settle() {
        let now = Instant::now();
        let mut seek = SeekCoordinator::new(Duration::from_millis(150));
        assert_eq!(seek.begin(0.5, 200.0, now), Some(100.0));
        assert_eq!(seek.target(), Some(100.0));

        assert!(!seek.expire(now + Duration::from_millis(149)));
        assert!(seek.is_pending());
        assert!(seek.expire(now + Duration::from_millis(150)));
        assert!(!seek.is_pending());
        assert!(!seek.expire(now + Duration::from_millis(151)));
    }

    #[test]
    fn later_seek_restarts_window() {
        let now = Instant::now();
        let mut seek = SeekCoordinator::new(Duration::from_millis(150));
        seek.begin(0.1, 100.0, now);
        let later = now + Duration::from_millis(100);
        seek.begin(0.9, 100.0, later);
        assert_eq!(seek.target(), Some(90.0));
        assert_eq!(seek.deadline(), Some(later + Duration::from_millis(150)));
        assert!(!seek.expire(now + Duration::from_millis(200)));
    }

    #[test]
    fn nan_ratio_seeks_to_start() {
        let mut seek = SeekCoordinator::new(Duration::from_millis(150));
        assert_eq!(seek.begin(f64::NAN, 100.0, Instant::now()), Some(0.0));
    }
}
