//! Media resolution: link or search text in, one playable stream out.

mod types;
mod ytdlp;

pub use types::*;
pub use ytdlp::YtDlpResolver;
