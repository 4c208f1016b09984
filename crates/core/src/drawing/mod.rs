//! Prize drawings: timed events that resolve exactly once past their deadline.

mod registry;
mod types;

pub use registry::DrawingRegistry;
pub use types::*;
