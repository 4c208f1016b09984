pub mod auth;
pub mod config;
pub mod drawing;
pub mod engine;
pub mod media;
pub mod members;
pub mod metrics;
pub mod platform;
pub mod playback;
pub mod prober;
pub mod status;
pub mod store;
pub mod tenant;
pub mod testing;
pub mod warns;

pub use auth::{
    create_authenticator, AuthError, AuthRequest, Authenticator, Identity, NoneAuthenticator,
};
pub use config::{
    config_path, load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    SanitizedConfig,
};
pub use drawing::{Drawing, DrawingError, DrawingOutcome, DrawingRegistry, DrawingRequest};
pub use engine::{Collaborators, Engine, EngineConfig, EngineStatus, PlayError};
pub use media::{MediaError, MediaResolver, ResolvedMedia, YtDlpResolver};
pub use members::{AnnouncementKind, JoinReport, MemberEvents};
pub use platform::{BridgeClient, ChatPlatform, Participant, PlatformError, VoiceGateway};
pub use playback::{
    EnqueueOutcome, PlaybackController, PlaybackError, PlaybackToken, QueueEntry, QueueSnapshot,
};
pub use prober::{MinecraftProber, ProbeError, ServerStatus, StatusProber};
pub use status::{CycleReport, DisplayHandle, StatusDisplayLoop};
pub use store::{ConfigStore, JsonFileStore, StoreError, TenantConfig, TenantSettings};
pub use tenant::{ChannelId, MessageId, RoleId, TenantId, UserId};
pub use warns::WarnBook;
