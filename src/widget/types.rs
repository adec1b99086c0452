//! Widget boundary types: handle ids, state codes, events and the two traits
//! a backend implements.

use std::fmt;
use std::sync::mpsc::Sender;

use super::bootstrap::ReadySignal;

/// Identifies one widget instance for the lifetime of the process.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Playback state reported by a widget.
///
/// Raw codes: `-1` unstarted, `0` ended, `1` playing, `2` paused,
/// `3` buffering, `5` cued.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StateCode {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl StateCode {
    /// Map a raw widget code, returning `None` for codes we do not know.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::Unstarted),
            0 => Some(Self::Ended),
            1 => Some(Self::Playing),
            2 => Some(Self::Paused),
            3 => Some(Self::Buffering),
            5 => Some(Self::Cued),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Unstarted => -1,
            Self::Ended => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Buffering => 3,
            Self::Cued => 5,
        }
    }
}

/// Asynchronous notifications delivered by the widget layer.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// The process-wide widget API finished loading.
    ApiReady,
    /// The widget created for `handle` accepts commands from now on.
    Ready { handle: HandleId },
    /// The widget created for `handle` changed its playback state.
    StateChange { handle: HandleId, code: i32 },
}

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("widget api is not loaded")]
    ApiNotLoaded,
    #[error("widget handle {0} is gone")]
    Gone(HandleId),
    #[error("widget is in transition")]
    Transition,
    #[error("media `{media}` could not be loaded: {reason}")]
    Media { media: String, reason: String },
}

/// One live widget instance bound to a single media reference.
///
/// Implementations may assume they are only driven after they fired
/// `WidgetEvent::Ready`; the adapter enforces that.
pub trait Widget {
    fn play(&mut self) -> Result<(), WidgetError>;
    fn pause(&mut self) -> Result<(), WidgetError>;
    /// Volume in percent, `0..=100`.
    fn set_volume(&mut self, percent: u8) -> Result<(), WidgetError>;
    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool) -> Result<(), WidgetError>;
    fn current_time(&self) -> Result<f64, WidgetError>;
    fn duration(&self) -> Result<f64, WidgetError>;
    /// Release the underlying resource. Must be safe to call once.
    fn destroy(&mut self);
}

/// Factory side of the widget boundary.
pub trait WidgetBackend: Send + Sync {
    /// Load the process-wide API. Call `ready.ready()` (possibly from another
    /// thread, possibly later) once widgets can be created.
    fn load_api(&self, ready: ReadySignal);

    /// Release the process-wide API after the last user let go of it.
    fn unload_api(&self) {}

    /// Create a widget for `media`. Events for it must be sent on `events`
    /// tagged with `handle`.
    fn create(
        &self,
        handle: HandleId,
        media: &str,
        events: Sender<WidgetEvent>,
    ) -> Result<Box<dyn Widget>, WidgetError>;
}
