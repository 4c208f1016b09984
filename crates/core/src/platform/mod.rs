//! Chat/voice platform abstraction.
//!
//! `ChatPlatform` covers messages, reactions and roles; `VoiceGateway` covers the
//! voice connection and audio streaming. `BridgeClient` implements both against
//! the platform bridge sidecar.

mod bridge;
mod types;

use std::future::Future;
use std::time::Duration;

pub use bridge::BridgeClient;
pub use types::*;

/// Bound a platform call, mapping an elapsed deadline to `PlatformError::Timeout`.
pub async fn bounded<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T, PlatformError>>,
) -> Result<T, PlatformError> {
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or(Err(PlatformError::Timeout))
}
