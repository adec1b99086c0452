//! Track catalog: the ordered list of tracks the player works through,
//! category filtering, and the loaders that build it.
//!
//! The catalog is read-only once built. Views select a subset of it by
//! category without touching the base list.

mod export;
mod load;
mod lrc;
mod model;
mod scan;

pub use export::*;
pub use lrc::parse_lrc;
pub use model::*;
pub use scan::scan;
