//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every external collaborator
//! trait, so the engine and the HTTP surface can be exercised without a chat
//! platform, yt-dlp or a game server.
//!
//! # Example
//!
//! ```rust,ignore
//! use steward_core::testing::{fixtures, MockPlatform, MockVoiceGateway};
//!
//! let voice = Arc::new(MockVoiceGateway::new());
//! let controller = PlaybackController::new(voice.clone(), Duration::from_secs(1));
//!
//! controller.ensure_connected(&tenant, &channel).await?;
//! controller.enqueue(&tenant, fixtures::entry("A")).await?;
//! assert_eq!(voice.played(&tenant).await, vec![fixtures::stream_url("A")]);
//! ```

mod memory_store;
mod mock_platform;
mod mock_prober;
mod mock_resolver;
mod mock_voice;

pub use memory_store::MemoryConfigStore;
pub use mock_platform::{EditedMessage, MockPlatform, SentMessage};
pub use mock_prober::MockProber;
pub use mock_resolver::MockResolver;
pub use mock_voice::{MockVoiceGateway, VoiceCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::media::ResolvedMedia;
    use crate::platform::Participant;
    use crate::playback::QueueEntry;
    use crate::prober::ServerStatus;
    use crate::tenant::UserId;

    /// Stream URL used by the fixtures for a title.
    pub fn stream_url(title: &str) -> String {
        format!("https://media.example.com/{}", title.to_lowercase().replace(' ', "-"))
    }

    /// A resolved item with reasonable defaults.
    pub fn media(title: &str) -> ResolvedMedia {
        ResolvedMedia {
            stream_url: stream_url(title),
            title: title.to_string(),
            thumbnail: None,
            uploader: Some("Test Uploader".to_string()),
        }
    }

    pub fn entry(title: &str) -> QueueEntry {
        QueueEntry::from(media(title))
    }

    /// A member or reactor. Display name is the id with a `name-` prefix.
    pub fn participant(user_id: &str, automated: bool) -> Participant {
        Participant {
            user_id: UserId::from(user_id),
            display_name: format!("name-{}", user_id),
            automated,
        }
    }

    pub fn online_status(players: u32, max: u32) -> ServerStatus {
        ServerStatus {
            online: true,
            players_online: Some(players),
            players_max: Some(max),
            version: Some("1.20.4".to_string()),
            description: Some("§aA §lMinecraft§r server".to_string()),
            sample_names: Vec::new(),
        }
    }
}
