//! Widget backend that plays local audio files.
//!
//! Media references are file paths. Loading the API spawns one engine
//! thread that owns the audio output stream; every widget is a sink inside
//! that engine addressed by its `HandleId`. Commands travel over a channel,
//! positions are read back from a shared clock table.

mod engine;
mod sink;

use std::collections::HashMap;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::bootstrap::ReadySignal;
use super::types::{HandleId, Widget, WidgetBackend, WidgetError, WidgetEvent};

use engine::{EngineCmd, spawn_engine};

/// Playback clock for one handle, written by the engine thread.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Clock {
    pub accumulated: Duration,
    pub started_at: Option<Instant>,
    pub duration: Duration,
}

impl Clock {
    pub fn position(&self) -> Duration {
        let pos = self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed());
        if self.duration > Duration::ZERO {
            pos.min(self.duration)
        } else {
            pos
        }
    }
}

pub(crate) type ClockTable = Arc<Mutex<HashMap<HandleId, Clock>>>;

#[derive(Default)]
pub struct LocalBackend {
    tx: Mutex<Option<Sender<EngineCmd>>>,
    clocks: ClockTable,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn sender(&self) -> Option<Sender<EngineCmd>> {
        self.tx.lock().ok().and_then(|tx| tx.clone())
    }
}

impl WidgetBackend for LocalBackend {
    fn load_api(&self, ready: ReadySignal) {
        let (tx, rx) = mpsc::channel::<EngineCmd>();
        if let Ok(mut slot) = self.tx.lock() {
            *slot = Some(tx);
        }
        spawn_engine(rx, self.clocks.clone(), ready);
    }

    fn unload_api(&self) {
        let tx = self.tx.lock().ok().and_then(|mut tx| tx.take());
        if let Some(tx) = tx {
            let _ = tx.send(EngineCmd::Shutdown);
        }
    }

    fn create(
        &self,
        handle: HandleId,
        media: &str,
        events: Sender<WidgetEvent>,
    ) -> Result<Box<dyn Widget>, WidgetError> {
        let tx = self.sender().ok_or(WidgetError::ApiNotLoaded)?;
        tx.send(EngineCmd::Load {
            handle,
            path: media.into(),
            events,
        })
        .map_err(|_| WidgetError::ApiNotLoaded)?;

        Ok(Box::new(LocalWidget {
            handle,
            tx,
            clocks: self.clocks.clone(),
            destroyed: false,
        }))
    }
}

struct LocalWidget {
    handle: HandleId,
    tx: Sender<EngineCmd>,
    clocks: ClockTable,
    destroyed: bool,
}

impl LocalWidget {
    fn send(&self, cmd: EngineCmd) -> Result<(), WidgetError> {
        self.tx.send(cmd).map_err(|_| WidgetError::Gone(self.handle))
    }

    fn clock(&self) -> Result<Clock, WidgetError> {
        let clocks = self.clocks.lock().map_err(|_| WidgetError::Transition)?;
        clocks
            .get(&self.handle)
            .copied()
            .ok_or(WidgetError::Gone(self.handle))
    }
}

impl Widget for LocalWidget {
    fn play(&mut self) -> Result<(), WidgetError> {
        self.send(EngineCmd::Play(self.handle))
    }

    fn pause(&mut self) -> Result<(), WidgetError> {
        self.send(EngineCmd::Pause(self.handle))
    }

    fn set_volume(&mut self, percent: u8) -> Result<(), WidgetError> {
        self.send(EngineCmd::SetVolume(self.handle, percent.min(100)))
    }

    fn seek_to(&mut self, seconds: f64, _allow_seek_ahead: bool) -> Result<(), WidgetError> {
        // Local files are fully available, so seeking ahead is always allowed.
        let at = Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::ZERO);
        self.send(EngineCmd::Seek(self.handle, at))
    }

    fn current_time(&self) -> Result<f64, WidgetError> {
        self.clock().map(|c| c.position().as_secs_f64())
    }

    fn duration(&self) -> Result<f64, WidgetError> {
        self.clock().map(|c| c.duration.as_secs_f64())
    }

    fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            let _ = self.send(EngineCmd::Destroy(self.handle));
        }
    }
}

impl Drop for LocalWidget {
    fn drop(&mut self) {
        self.destroy();
    }
}
