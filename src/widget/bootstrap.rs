//! Process-wide widget API bootstrap.
//!
//! Loading a widget API is global state: it happens once, however many
//! adapters need it. `Bootstrap` counts its users through `BootstrapLease`s,
//! triggers `WidgetBackend::load_api` for the first one, and broadcasts
//! `WidgetEvent::ApiReady` to every subscriber when the backend signals
//! readiness. When the last lease is dropped the API is unloaded and the
//! bootstrap returns to idle.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use super::types::{WidgetBackend, WidgetEvent};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ApiPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Default)]
struct BootstrapState {
    phase: ApiPhase,
    refs: usize,
    generation: u64,
    backend: Option<Arc<dyn WidgetBackend>>,
    subscribers: Vec<Sender<WidgetEvent>>,
}

#[derive(Default)]
pub struct Bootstrap {
    state: Mutex<BootstrapState>,
}

impl Bootstrap {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The bootstrap shared by the whole process.
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<Bootstrap>> = OnceLock::new();
        GLOBAL.get_or_init(Bootstrap::new).clone()
    }

    /// Register a user of the API. `events` receives `ApiReady` once the API
    /// is loaded (right away if it already is).
    pub fn acquire(
        self: &Arc<Self>,
        backend: Arc<dyn WidgetBackend>,
        events: Sender<WidgetEvent>,
    ) -> BootstrapLease {
        let load = {
            let mut state = self.lock();
            state.refs += 1;
            match state.phase {
                ApiPhase::Ready => {
                    let _ = events.send(WidgetEvent::ApiReady);
                    None
                }
                ApiPhase::Idle => {
                    state.phase = ApiPhase::Loading;
                    state.generation += 1;
                    state.backend = Some(backend.clone());
                    state.subscribers.push(events);
                    Some(state.generation)
                }
                ApiPhase::Loading | ApiPhase::Failed(_) => {
                    state.subscribers.push(events);
                    None
                }
            }
        };

        // The backend may signal synchronously, so the lock must be released first.
        if let Some(generation) = load {
            tracing::debug!(generation, "loading widget api");
            backend.load_api(ReadySignal {
                bootstrap: self.clone(),
                generation,
            });
        }

        BootstrapLease {
            bootstrap: self.clone(),
        }
    }

    pub fn phase(&self) -> ApiPhase {
        self.lock().phase.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.lock().phase == ApiPhase::Ready
    }

    #[cfg(test)]
    pub fn ref_count(&self) -> usize {
        self.lock().refs
    }

    fn lock(&self) -> MutexGuard<'_, BootstrapState> {
        // The state stays consistent across a panicking holder, so recover it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn finish(&self, generation: u64, result: Result<(), String>) {
        let mut state = self.lock();
        if state.generation != generation || state.phase != ApiPhase::Loading {
            return;
        }

        match result {
            Ok(()) => {
                tracing::info!("widget api ready");
                state.phase = ApiPhase::Ready;
                for tx in state.subscribers.drain(..) {
                    let _ = tx.send(WidgetEvent::ApiReady);
                }
            }
            Err(reason) => {
                tracing::warn!(%reason, "widget api failed to load");
                state.phase = ApiPhase::Failed(reason);
                state.subscribers.clear();
            }
        }
    }

    fn release(&self) {
        let unload = {
            let mut state = self.lock();
            state.refs = state.refs.saturating_sub(1);
            if state.refs == 0 {
                state.phase = ApiPhase::Idle;
                state.subscribers.clear();
                state.backend.take()
            } else {
                None
            }
        };

        if let Some(backend) = unload {
            tracing::debug!("unloading widget api");
            backend.unload_api();
        }
    }
}

/// Handed to `WidgetBackend::load_api`; consumed to report the outcome.
pub struct ReadySignal {
    bootstrap: Arc<Bootstrap>,
    generation: u64,
}

impl ReadySignal {
    pub fn ready(self) {
        self.bootstrap.finish(self.generation, Ok(()));
    }

    pub fn failed(self, reason: impl Into<String>) {
        self.bootstrap.finish(self.generation, Err(reason.into()));
    }
}

/// Keeps the widget API loaded while alive.
pub struct BootstrapLease {
    bootstrap: Arc<Bootstrap>,
}

impl BootstrapLease {
    pub fn is_ready(&self) -> bool {
        self.bootstrap.is_ready()
    }
}

impl Drop for BootstrapLease {
    fn drop(&mut self) {
        self.bootstrap.release();
    }
}
