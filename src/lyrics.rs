//! Active-line tracking for time-coded lyrics.

use crate::catalog::LyricCue;

/// Index of the last cue whose time is `<= position`, if any.
///
/// `cues` must be sorted by time.
pub fn active_cue(cues: &[LyricCue], position: f64) -> Option<usize> {
    if position.is_nan() {
        return None;
    }
    cues.partition_point(|c| c.time <= position).checked_sub(1)
}

/// Remembers the active cue so renders only happen on change.
///
/// Starts at the first line. Positions before the first cue leave it where
/// it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricCursor {
    index: usize,
}

impl LyricCursor {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Recompute for `position`; returns `true` when the active line moved.
    pub fn update(&mut self, cues: &[LyricCue], position: f64) -> bool {
        match active_cue(cues, position) {
            Some(next) if next != self.index => {
                self.index = next;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}
