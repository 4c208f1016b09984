//! Endpoint status probing for the status displays.

mod minecraft;
mod types;

pub use minecraft::MinecraftProber;
pub use types::*;
