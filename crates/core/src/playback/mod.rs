//! Per-tenant media queue coupled to a live voice session.
//!
//! Queue and session live in memory only and start empty after a restart.

mod controller;
mod types;

pub use controller::PlaybackController;
pub use types::*;
