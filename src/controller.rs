//! Playback controller: the state machine and the session it owns.
//!
//! `Controller` ties the adapter, poller, seek coordinator and lyric cursor
//! together. The presentation layer only sees `SessionSnapshot`s and calls
//! the command methods.

mod model;
mod session;
mod transport;

pub use model::*;
pub use session::SessionSnapshot;
pub use transport::PlaybackState;
