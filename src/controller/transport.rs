//! Transport rules: lifecycle transitions and next/prev index policy.

use rand::Rng;

use crate::widget::StateCode;

/// Event-confirmed playback state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Unstarted,
    Playing,
    Paused,
    Ended,
}

impl PlaybackState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Unstarted => "Stopped",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Ended => "Ended",
        }
    }
}

/// What the controller must do in response to a lifecycle event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Enter(PlaybackState),
    /// Ended with repeat on: play the same track again from the start.
    Replay,
    /// Ended with repeat off: move on per the next-track policy.
    Advance,
    /// Transient states (`buffering`, `cued`) are not authoritative.
    Unchanged,
}

pub fn on_lifecycle(code: StateCode, repeat: bool) -> Transition {
    match code {
        StateCode::Ended if repeat => Transition::Replay,
        StateCode::Ended => Transition::Advance,
        StateCode::Playing => Transition::Enter(PlaybackState::Playing),
        StateCode::Paused => Transition::Enter(PlaybackState::Paused),
        StateCode::Unstarted => Transition::Enter(PlaybackState::Unstarted),
        StateCode::Buffering | StateCode::Cued => Transition::Unchanged,
    }
}

/// Next index in a view of `len` tracks. Shuffle picks uniformly from the
/// whole view, the current track included.
pub fn next_index(current: usize, len: usize, shuffle: bool, rng: &mut impl Rng) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if shuffle {
        Some(rng.gen_range(0..len))
    } else {
        Some((current + 1) % len)
    }
}

/// Previous index, always circular regardless of shuffle.
pub fn prev_index(current: usize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some((current % len + len - 1) % len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn lifecycle_codes_map_to_transitions() {
        assert_eq!(on_lifecycle(StateCode::Ended, true), Transition::Replay);
        assert_eq!(on_lifecycle(StateCode::Ended, false), Transition::Advance);
        assert_eq!(
            on_lifecycle(StateCode::Playing, false),
            Transition::Enter(PlaybackState::Playing)
        );
        assert_eq!(
            on_lifecycle(StateCode::Paused, true),
            Transition::Enter(PlaybackState::Paused)
        );
        assert_eq!(on_lifecycle(StateCode::Buffering, false), Transition::Unchanged);
        assert_eq!(on_lifecycle(StateCode::Cued, false), Transition::Unchanged);
    }

    #[test]
    fn next_and_prev_wrap() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(next_index(4, 5, false, &mut rng), Some(0));
        assert_eq!(next_index(1, 5, false, &mut rng), Some(2));
        assert_eq!(prev_index(0, 5), Some(4));
        assert_eq!(prev_index(3, 5), Some(2));
        assert_eq!(next_index(0, 0, false, &mut rng), None);
        assert_eq!(prev_index(0, 0), None);
    }

    #[test]
    fn shuffle_is_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 4;
        let trials = 8_000;
        let mut counts = vec![0usize; n];
        for _ in 0..trials {
            let i = next_index(0, n, true, &mut rng).unwrap();
            assert!(i < n);
            counts[i] += 1;
        }
        let expected = trials / n;
        for c in counts {
            assert!(c.abs_diff(expected) < expected / 5, "count {c} too far from {expected}");
        }
    }
}
