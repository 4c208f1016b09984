//! Status displays: one probed, edited-in-place message per tenant.

mod display;
mod render;

pub use display::{CycleReport, DisplayHandle, StatusDisplayLoop, UpsertResult};
pub use render::{render_status, strip_formatting, DISPLAY_TITLE};
