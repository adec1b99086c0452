//! The `Controller`: single owner of the playback session.
//!
//! It reconciles two producers. Widget lifecycle events arrive through
//! `handle_widget_event` and drive the state machine; position samples
//! arrive through `tick` from the poller. Commands go out through the
//! adapter and are confirmed by later events, so `state` can lag
//! `wants_playing` by one round trip.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::adapter::{AdapterEvent, PlayerAdapter, PlayerCommand};
use crate::catalog::{ALL_CATEGORIES, Catalog, CatalogView, PlaylistExport, Track};
use crate::config::PlaybackSettings;
use crate::lyrics::LyricCursor;
use crate::poller::TimeSyncPoller;
use crate::seek::SeekCoordinator;
use crate::widget::WidgetEvent;

use super::session::{Session, SessionSnapshot};
use super::transport::{PlaybackState, Transition, next_index, on_lifecycle, prev_index};

pub struct Controller {
    catalog: Catalog,
    view: CatalogView,
    session: Session,
    liked: BTreeSet<u32>,
    adapter: PlayerAdapter,
    poller: TimeSyncPoller,
    seek: SeekCoordinator,
    cursor: LyricCursor,
    rng: StdRng,
    mounted: bool,
    resume_on_ready: bool,
}

impl Controller {
    pub fn new(catalog: Catalog, adapter: PlayerAdapter, settings: &PlaybackSettings) -> Self {
        Self::with_rng(catalog, adapter, settings, StdRng::from_entropy())
    }

    /// Like `new`, with an explicit shuffle RNG.
    pub fn with_rng(
        catalog: Catalog,
        adapter: PlayerAdapter,
        settings: &PlaybackSettings,
        rng: StdRng,
    ) -> Self {
        let view = catalog.filter(ALL_CATEGORIES);
        let session = Session {
            active: (!view.is_empty()).then_some(0),
            track_id: view.track(&catalog, 0).map(|t| t.id),
            volume: settings.volume.clamp(0.0, 1.0),
            shuffle: settings.shuffle,
            repeat: settings.repeat,
            ..Session::default()
        };
        Self {
            catalog,
            view,
            session,
            liked: BTreeSet::new(),
            adapter,
            poller: TimeSyncPoller::new(Duration::from_millis(settings.poll_interval_ms)),
            seek: SeekCoordinator::new(Duration::from_millis(settings.seek_settle_ms)),
            cursor: LyricCursor::default(),
            rng,
            mounted: false,
            resume_on_ready: settings.resume_on_ready,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn view(&self) -> &CatalogView {
        &self.view
    }

    pub fn categories(&self) -> Vec<String> {
        self.catalog.categories()
    }

    pub fn active_track(&self) -> Option<&Track> {
        self.session
            .active
            .and_then(|pos| self.view.track(&self.catalog, pos))
    }

    pub fn is_liked(&self, id: u32) -> bool {
        self.liked.contains(&id)
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        let track = self.active_track();
        let duration = if self.session.duration > 0.0 {
            self.session.duration
        } else {
            track.map_or(0.0, |t| t.duration)
        };
        SessionSnapshot {
            track,
            active: self.session.active,
            category: self.view.category(),
            state: self.session.state,
            wants_playing: self.session.wants_playing,
            position: self.session.position,
            duration,
            progress: self.session.progress,
            volume: self.session.volume,
            shuffle: self.session.shuffle,
            repeat: self.session.repeat,
            ready: self.session.ready,
            seeking: self.seek.target().is_some(),
            api: self.adapter.api_phase(),
            lyric_index: self.cursor.index(),
            liked: track.is_some_and(|t| self.liked.contains(&t.id)),
        }
    }

    /// The host surface appeared: create the widget for the active track.
    pub fn mount(&mut self, now: Instant) {
        self.mounted = true;
        self.load_active(now);
    }

    /// The host surface went away: stop sampling and release the widget.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.poller.stop();
        self.seek.cancel();
        self.adapter.release();
        self.session.ready = false;
    }

    /// Earliest instant at which `tick` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.poller.next_deadline(), self.seek.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ---- transport ----

    pub fn toggle_play(&mut self) {
        if self.active_track().is_none() {
            return;
        }
        self.session.wants_playing = !self.session.wants_playing;
        let cmd = if self.session.wants_playing {
            PlayerCommand::Play
        } else {
            PlayerCommand::Pause
        };
        self.adapter.command(cmd);
    }

    pub fn next(&mut self, now: Instant) {
        let Some(current) = self.session.active else {
            return;
        };
        let target = next_index(current, self.view.len(), self.session.shuffle, &mut self.rng);
        if let Some(target) = target {
            self.go_to(target, now);
        }
    }

    pub fn prev(&mut self, now: Instant) {
        let Some(current) = self.session.active else {
            return;
        };
        if let Some(target) = prev_index(current, self.view.len()) {
            self.go_to(target, now);
        }
    }

    /// Seek to `ratio` of the known duration. No-op until a duration is known.
    pub fn seek_by_ratio(&mut self, ratio: f64, now: Instant) -> bool {
        let duration = self.session.duration;
        let Some(target) = self.seek.begin(ratio, duration, now) else {
            tracing::debug!(ratio, "seek ignored, duration unknown");
            return false;
        };
        self.adapter.command(PlayerCommand::SeekAbsolute(target));

        // Optimistic: show the target before the widget confirms it.
        self.session.position = target;
        self.session.progress = (target / duration * 100.0).clamp(0.0, 100.0);
        self.update_lyrics();
        true
    }

    /// Scrub by `delta` seconds from the current position.
    pub fn seek_relative(&mut self, delta: f64, now: Instant) -> bool {
        let duration = self.session.duration;
        if duration <= 0.0 {
            return false;
        }
        let ratio = (self.session.position + delta) / duration;
        self.seek_by_ratio(ratio, now)
    }

    pub fn set_volume(&mut self, volume: f64) {
        if volume.is_nan() {
            return;
        }
        self.session.volume = volume.clamp(0.0, 1.0);
        self.adapter
            .command(PlayerCommand::SetVolume(self.session.volume));
    }

    pub fn toggle_shuffle(&mut self) {
        self.session.shuffle = !self.session.shuffle;
    }

    pub fn toggle_repeat(&mut self) {
        self.session.repeat = !self.session.repeat;
    }

    pub fn toggle_like(&mut self, id: u32) {
        if !self.liked.remove(&id) {
            self.liked.insert(id);
        }
    }

    /// Re-filter by `category` and move to its first track.
    pub fn select_category(&mut self, category: &str, now: Instant) {
        self.view = self.catalog.filter(category);
        if self.view.is_empty() {
            self.deactivate();
        } else {
            self.activate(0, now);
        }
    }

    /// Play the view's `pos`-th track.
    pub fn select_track(&mut self, pos: usize, now: Instant) {
        if pos >= self.view.len() {
            return;
        }
        self.session.wants_playing = true;
        if !self.activate(pos, now) {
            self.adapter.command(PlayerCommand::Play);
        }
    }

    pub fn export_playlist(&self) -> Result<PlaylistExport, serde_json::Error> {
        PlaylistExport::build(self.view.category(), self.view.tracks(&self.catalog))
    }

    // ---- producers ----

    /// Feed one widget event through the adapter into the state machine.
    pub fn handle_widget_event(&mut self, event: WidgetEvent, now: Instant) {
        let event = self.adapter.handle_event(event);
        self.sync_poller(now);

        match event {
            Some(AdapterEvent::Ready) => {
                self.session.ready = true;
                self.adapter
                    .command(PlayerCommand::SetVolume(self.session.volume));
                if self.resume_on_ready && self.session.wants_playing {
                    self.adapter.command(PlayerCommand::Play);
                }
            }
            Some(AdapterEvent::Lifecycle(code)) => {
                match on_lifecycle(code, self.session.repeat) {
                    Transition::Enter(state) => {
                        self.session.state = state;
                        match state {
                            PlaybackState::Playing => self.session.wants_playing = true,
                            PlaybackState::Paused => self.session.wants_playing = false,
                            PlaybackState::Unstarted | PlaybackState::Ended => {}
                        }
                    }
                    Transition::Replay => {
                        self.session.state = PlaybackState::Playing;
                        self.session.wants_playing = true;
                        self.restart();
                    }
                    Transition::Advance => {
                        self.session.state = PlaybackState::Ended;
                        self.next(now);
                    }
                    Transition::Unchanged => {}
                }
            }
            None => {}
        }
    }

    /// Run due timers. Returns `true` when the timeline changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if self.seek.expire(now) {
            changed = true;
        }

        let adapter = &self.adapter;
        let Some(sample) = self.poller.poll(now, || adapter.sample()) else {
            return changed;
        };
        if self.seek.is_pending() {
            tracing::trace!(position = sample.position, "discarding sample during seek");
            return changed;
        }

        self.session.position = sample.position;
        self.session.duration = sample.duration;
        self.session.progress = sample.progress();
        self.update_lyrics();
        true
    }

    // ---- internals ----

    fn update_lyrics(&mut self) -> bool {
        let position = self.session.position;
        let Some(pos) = self.session.active else {
            return false;
        };
        let Some(track) = self.view.track(&self.catalog, pos) else {
            return false;
        };
        self.cursor.update(track.cues(), position)
    }

    fn sync_poller(&mut self, now: Instant) {
        if self.adapter.is_live() {
            self.poller.start(now);
        } else {
            self.poller.stop();
        }
    }

    fn load_active(&mut self, now: Instant) {
        if !self.mounted {
            return;
        }
        let Some(media) = self.active_track().map(|t| t.media.clone()) else {
            return;
        };
        self.adapter.initialize(&media);
        self.sync_poller(now);
    }

    /// Make the view's `pos`-th track active. Returns `false` when it was
    /// already the active track.
    fn activate(&mut self, pos: usize, now: Instant) -> bool {
        let Some(track) = self.view.track(&self.catalog, pos) else {
            self.deactivate();
            return true;
        };
        self.session.active = Some(pos);
        if self.session.track_id == Some(track.id) {
            return false;
        }
        tracing::info!(id = track.id, title = %track.title, "switching track");
        self.session.track_id = Some(track.id);

        // Tear down before the new widget exists so nothing samples a dead handle.
        self.poller.stop();
        self.seek.cancel();
        self.adapter.destroy();
        self.session.reset_timeline();
        self.session.state = PlaybackState::Unstarted;
        self.cursor.reset();

        self.load_active(now);
        true
    }

    fn deactivate(&mut self) {
        self.session.active = None;
        self.session.track_id = None;
        self.poller.stop();
        self.seek.cancel();
        self.adapter.destroy();
        self.session.reset_timeline();
        self.session.state = PlaybackState::Unstarted;
        self.cursor.reset();
    }

    fn go_to(&mut self, pos: usize, now: Instant) {
        if !self.activate(pos, now) {
            self.restart();
        }
    }

    /// Start the active track over on the current widget.
    fn restart(&mut self) {
        self.seek.cancel();
        self.session.position = 0.0;
        self.session.progress = 0.0;
        self.cursor.reset();
        self.adapter.command(PlayerCommand::SeekAbsolute(0.0));
        if self.session.wants_playing {
            self.adapter.command(PlayerCommand::Play);
        }
    }

    #[cfg(test)]
    pub(crate) fn adapter(&self) -> &PlayerAdapter {
        &self.adapter
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.unmount();
    }
}
