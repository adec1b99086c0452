//! Scripted widget backend used by unit tests.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use super::bootstrap::ReadySignal;
use super::types::{HandleId, Widget, WidgetBackend, WidgetError, WidgetEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Play(HandleId),
    Pause(HandleId),
    SetVolume(HandleId, u8),
    SeekTo(HandleId, f64, bool),
    Destroy(HandleId),
}

#[derive(Default)]
struct FakeState {
    calls: Vec<Call>,
    created: Vec<(HandleId, String)>,
    loads: usize,
    unloads: usize,
    pending_ready: Option<ReadySignal>,
    position: f64,
    duration: f64,
    failing_reads: bool,
}

/// Records every widget call. The API is either ready immediately or held
/// back until `fire_api_ready`.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
    deferred: bool,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deferred() -> Self {
        Self {
            deferred: true,
            ..Self::default()
        }
    }

    pub fn fire_api_ready(&self) {
        let signal = self.state.lock().unwrap().pending_ready.take();
        if let Some(signal) = signal {
            signal.ready();
        }
    }

    pub fn fail_api_load(&self, reason: &str) {
        let signal = self.state.lock().unwrap().pending_ready.take();
        if let Some(signal) = signal {
            signal.failed(reason);
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn created(&self) -> Vec<(HandleId, String)> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn loads(&self) -> usize {
        self.state.lock().unwrap().loads
    }

    pub fn unloads(&self) -> usize {
        self.state.lock().unwrap().unloads
    }

    pub fn set_clock(&self, position: f64, duration: f64) {
        let mut s = self.state.lock().unwrap();
        s.position = position;
        s.duration = duration;
    }

    pub fn set_failing_reads(&self, failing: bool) {
        self.state.lock().unwrap().failing_reads = failing;
    }
}

impl WidgetBackend for FakeBackend {
    fn load_api(&self, ready: ReadySignal) {
        let deferred = {
            let mut s = self.state.lock().unwrap();
            s.loads += 1;
            if self.deferred {
                s.pending_ready = Some(ready);
                None
            } else {
                Some(ready)
            }
        };
        if let Some(ready) = deferred {
            ready.ready();
        }
    }

    fn unload_api(&self) {
        self.state.lock().unwrap().unloads += 1;
    }

    fn create(
        &self,
        handle: HandleId,
        media: &str,
        _events: Sender<WidgetEvent>,
    ) -> Result<Box<dyn Widget>, WidgetError> {
        self.state
            .lock()
            .unwrap()
            .created
            .push((handle, media.to_string()));
        Ok(Box::new(FakeWidget {
            handle,
            state: self.state.clone(),
        }))
    }
}

struct FakeWidget {
    handle: HandleId,
    state: Arc<Mutex<FakeState>>,
}

impl FakeWidget {
    fn record(&self, call: Call) -> Result<(), WidgetError> {
        self.state.lock().unwrap().calls.push(call);
        Ok(())
    }

    fn read(&self, pick: impl FnOnce(&FakeState) -> f64) -> Result<f64, WidgetError> {
        let s = self.state.lock().unwrap();
        if s.failing_reads {
            return Err(WidgetError::Transition);
        }
        Ok(pick(&s))
    }
}

impl Widget for FakeWidget {
    fn play(&mut self) -> Result<(), WidgetError> {
        self.record(Call::Play(self.handle))
    }

    fn pause(&mut self) -> Result<(), WidgetError> {
        self.record(Call::Pause(self.handle))
    }

    fn set_volume(&mut self, percent: u8) -> Result<(), WidgetError> {
        self.record(Call::SetVolume(self.handle, percent))
    }

    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool) -> Result<(), WidgetError> {
        self.record(Call::SeekTo(self.handle, seconds, allow_seek_ahead))
    }

    fn current_time(&self) -> Result<f64, WidgetError> {
        self.read(|s| s.position)
    }

    fn duration(&self) -> Result<f64, WidgetError> {
        self.read(|s| s.duration)
    }

    fn destroy(&mut self) {
        let _ = self.record(Call::Destroy(self.handle));
    }
}
