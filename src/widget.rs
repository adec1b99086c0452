//! Boundary with the external media widget.
//!
//! A widget is an opaque player instance created by a `WidgetBackend` for a
//! single media reference. The backend's API is loaded once per process via
//! the shared `Bootstrap`; every widget then reports its lifecycle through
//! `WidgetEvent`s tagged with the `HandleId` it was created for.

mod bootstrap;
pub mod local;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use bootstrap::*;
pub use types::*;
