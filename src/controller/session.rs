use crate::catalog::Track;
use crate::widget::ApiPhase;

use super::transport::PlaybackState;

/// Mutable playback session, owned by the controller.
#[derive(Debug, Clone, Default)]
pub(super) struct Session {
    /// Index into the current catalog view.
    pub active: Option<usize>,
    /// Id of the track the widget was created for.
    pub track_id: Option<u32>,
    pub state: PlaybackState,
    /// User intent; the UI renders this optimistically.
    pub wants_playing: bool,
    pub position: f64,
    pub duration: f64,
    pub progress: f64,
    pub volume: f64,
    pub shuffle: bool,
    pub repeat: bool,
    pub ready: bool,
}

impl Session {
    /// Forget everything sampled from the previous widget.
    pub fn reset_timeline(&mut self) {
        self.position = 0.0;
        self.duration = 0.0;
        self.progress = 0.0;
        self.ready = false;
    }
}

/// Read-only view of the session handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot<'a> {
    pub track: Option<&'a Track>,
    /// Position of `track` in the current view.
    pub active: Option<usize>,
    pub category: &'a str,
    pub state: PlaybackState,
    pub wants_playing: bool,
    pub position: f64,
    /// Widget-reported duration, or the track's nominal one until known.
    pub duration: f64,
    /// `0.0..=100.0`
    pub progress: f64,
    pub volume: f64,
    pub shuffle: bool,
    pub repeat: bool,
    pub ready: bool,
    pub seeking: bool,
    /// Load state of the shared widget API.
    pub api: ApiPhase,
    pub lyric_index: usize,
    pub liked: bool,
}
