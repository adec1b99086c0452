//! Owns the single widget instance and translates between controller
//! commands and the widget boundary.
//!
//! A widget only accepts commands after it fired its ready event. That is
//! encoded in `HandleWidget`: commands need a `ReadyWidget`, and a widget
//! that is still loading has none to offer, so early commands are dropped.

use std::sync::Arc;
use std::sync::mpsc::Sender;

use crate::poller::Sample;
use crate::widget::{
    ApiPhase, Bootstrap, BootstrapLease, HandleId, StateCode, Widget, WidgetBackend, WidgetError,
    WidgetEvent,
};

/// High-level commands the controller issues.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PlayerCommand {
    Play,
    Pause,
    /// Volume in `0.0..=1.0`.
    SetVolume(f64),
    /// Absolute position in seconds.
    SeekAbsolute(f64),
}

/// Widget events relevant to the controller, already filtered to the
/// current handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AdapterEvent {
    Ready,
    Lifecycle(StateCode),
}

/// A widget that has signalled readiness.
struct ReadyWidget(Box<dyn Widget>);

impl ReadyWidget {
    fn run(&mut self, cmd: PlayerCommand) -> Result<(), WidgetError> {
        match cmd {
            PlayerCommand::Play => self.0.play(),
            PlayerCommand::Pause => self.0.pause(),
            PlayerCommand::SetVolume(v) => self.0.set_volume(volume_percent(v)),
            PlayerCommand::SeekAbsolute(t) => self.0.seek_to(t.max(0.0), true),
        }
    }

    fn sample(&self) -> Result<Sample, WidgetError> {
        Ok(Sample {
            position: self.0.current_time()?,
            duration: self.0.duration()?,
        })
    }
}

enum HandleWidget {
    Loading(Box<dyn Widget>),
    Ready(ReadyWidget),
}

impl HandleWidget {
    fn destroy(self) {
        match self {
            HandleWidget::Loading(mut w) | HandleWidget::Ready(ReadyWidget(mut w)) => w.destroy(),
        }
    }
}

struct AdapterHandle {
    id: HandleId,
    media: String,
    widget: HandleWidget,
}

/// Map `0.0..=1.0` to the widget's integer percent scale.
pub fn volume_percent(volume: f64) -> u8 {
    if volume.is_nan() {
        return 0;
    }
    (volume.clamp(0.0, 1.0) * 100.0).round() as u8
}

pub struct PlayerAdapter {
    backend: Arc<dyn WidgetBackend>,
    bootstrap: Arc<Bootstrap>,
    events: Sender<WidgetEvent>,
    lease: Option<BootstrapLease>,
    handle: Option<AdapterHandle>,
    /// Media waiting for the API to finish loading.
    parked: Option<String>,
    next_id: u64,
}

impl PlayerAdapter {
    pub fn new(
        backend: Arc<dyn WidgetBackend>,
        bootstrap: Arc<Bootstrap>,
        events: Sender<WidgetEvent>,
    ) -> Self {
        Self {
            backend,
            bootstrap,
            events,
            lease: None,
            handle: None,
            parked: None,
            next_id: 1,
        }
    }

    /// Bind the adapter to `media`, replacing any current widget.
    ///
    /// Returns the new handle when the widget could be created right away.
    /// While the API is still loading the media is parked and the widget is
    /// created on `ApiReady`. Re-initializing with the current media is a
    /// no-op.
    pub fn initialize(&mut self, media: &str) -> Option<HandleId> {
        if let Some(h) = &self.handle {
            if h.media == media {
                return Some(h.id);
            }
        }
        if self.parked.as_deref() == Some(media) {
            return None;
        }
        self.destroy();

        if self.lease.is_none() {
            self.lease = Some(
                self.bootstrap
                    .acquire(self.backend.clone(), self.events.clone()),
            );
        }

        if self.lease.as_ref().is_some_and(BootstrapLease::is_ready) {
            self.create(media)
        } else {
            tracing::debug!(media, "widget api not ready, parking media");
            self.parked = Some(media.to_string());
            None
        }
    }

    fn create(&mut self, media: &str) -> Option<HandleId> {
        let id = HandleId(self.next_id);
        self.next_id += 1;

        match self.backend.create(id, media, self.events.clone()) {
            Ok(widget) => {
                tracing::debug!(handle = %id, media, "widget created");
                self.handle = Some(AdapterHandle {
                    id,
                    media: media.to_string(),
                    widget: HandleWidget::Loading(widget),
                });
                Some(id)
            }
            Err(err) => {
                tracing::warn!(media, %err, "failed to create widget");
                None
            }
        }
    }

    /// Destroy the current widget, if any. Idempotent.
    pub fn destroy(&mut self) {
        self.parked = None;
        if let Some(handle) = self.handle.take() {
            tracing::debug!(handle = %handle.id, "destroying widget");
            handle.widget.destroy();
        }
    }

    /// Destroy the widget and let go of the widget API.
    pub fn release(&mut self) {
        self.destroy();
        self.lease = None;
    }

    /// Issue `cmd` to a ready widget. Returns `false` when it was dropped.
    pub fn command(&mut self, cmd: PlayerCommand) -> bool {
        let Some(handle) = self.handle.as_mut() else {
            tracing::debug!(?cmd, "no widget, dropping command");
            return false;
        };
        let HandleWidget::Ready(widget) = &mut handle.widget else {
            tracing::debug!(handle = %handle.id, ?cmd, "widget not ready, dropping command");
            return false;
        };
        match widget.run(cmd) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(handle = %handle.id, ?cmd, %err, "widget command failed");
                false
            }
        }
    }

    /// Translate a raw widget event. Events for stale handles yield `None`.
    pub fn handle_event(&mut self, event: WidgetEvent) -> Option<AdapterEvent> {
        match event {
            WidgetEvent::ApiReady => {
                if let Some(media) = self.parked.take() {
                    self.create(&media);
                }
                None
            }
            WidgetEvent::Ready { handle } => match self.handle.take() {
                Some(AdapterHandle {
                    id,
                    media,
                    widget: HandleWidget::Loading(widget),
                }) if id == handle => {
                    tracing::debug!(%handle, "widget ready");
                    self.handle = Some(AdapterHandle {
                        id,
                        media,
                        widget: HandleWidget::Ready(ReadyWidget(widget)),
                    });
                    Some(AdapterEvent::Ready)
                }
                current => {
                    if current.as_ref().map(|h| h.id) != Some(handle) {
                        tracing::debug!(%handle, "ignoring ready from stale widget");
                    }
                    self.handle = current;
                    None
                }
            },
            WidgetEvent::StateChange { handle, code } => {
                if self.handle_id() != Some(handle) {
                    tracing::debug!(%handle, code, "ignoring state change from stale widget");
                    return None;
                }
                match StateCode::from_code(code) {
                    Some(state) => Some(AdapterEvent::Lifecycle(state)),
                    None => {
                        tracing::debug!(%handle, code, "unknown widget state code");
                        None
                    }
                }
            }
        }
    }

    /// Read the widget clock. `None` before ready or while the widget is
    /// between states.
    pub fn sample(&self) -> Option<Sample> {
        let handle = self.handle.as_ref()?;
        let HandleWidget::Ready(widget) = &handle.widget else {
            return None;
        };
        match widget.sample() {
            Ok(sample) => Some(sample),
            Err(err) => {
                tracing::trace!(handle = %handle.id, %err, "widget clock unreadable");
                None
            }
        }
    }

    pub fn handle_id(&self) -> Option<HandleId> {
        self.handle.as_ref().map(|h| h.id)
    }

    /// A widget exists for the current media.
    pub fn is_live(&self) -> bool {
        self.handle.is_some()
    }

    /// Load state of the shared widget API.
    pub fn api_phase(&self) -> ApiPhase {
        self.bootstrap.phase()
    }

    #[cfg(test)]
    pub fn is_ready(&self) -> bool {
        matches!(
            self.handle.as_ref().map(|h| &h.widget),
            Some(HandleWidget::Ready(_))
        )
    }

    #[cfg(test)]
    pub fn is_parked(&self) -> bool {
        self.parked.is_some()
    }
}

impl Drop for PlayerAdapter {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests;
