//! Types for talking to the chat/voice platform.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::playback::PlaybackToken;
use crate::tenant::{ChannelId, MessageId, RoleId, TenantId, UserId};

/// Errors returned by platform calls.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The target (message, channel, member) no longer exists.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The service lacks the permission for this action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Platform API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,
}

/// Embed colour as a 24-bit RGB value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const GREEN: Color = Color(0x2ecc71);
    pub const RED: Color = Color(0xe74c3c);
    pub const BLUE: Color = Color(0x3498db);
    pub const PURPLE: Color = Color(0x9b59b6);
    pub const GOLD: Color = Color(0xf1c40f);
    pub const ORANGE: Color = Color(0xe67e22);
}

/// A rich message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: Color,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Embed {
    pub fn new(title: impl Into<String>, color: Color) -> Self {
        Self {
            title: title.into(),
            description: None,
            color,
            fields: Vec::new(),
            footer: None,
            thumbnail_url: None,
            timestamp: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline: true,
        });
        self
    }

    /// Add a field that spans the full width.
    pub fn with_wide_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline: false,
        });
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn with_thumbnail(mut self, url: Option<String>) -> Self {
        self.thumbnail_url = url;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Value of the first field with this name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

/// What gets posted: plain text, an embed, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            embed: None,
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            text: None,
            embed: Some(embed),
        }
    }
}

/// A user as seen in a reaction list or voice channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: UserId,
    #[serde(default)]
    pub display_name: String,
    /// Bots and other automated accounts.
    #[serde(default)]
    pub automated: bool,
}

/// What the service may do in a voice channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicePermissions {
    pub connect: bool,
    pub speak: bool,
}

impl VoicePermissions {
    pub fn can_play(&self) -> bool {
        self.connect && self.speak
    }
}

/// Text-side platform operations.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Post a message and return its handle.
    async fn send_message(
        &self,
        channel: &ChannelId,
        content: &MessageContent,
    ) -> Result<MessageId, PlatformError>;

    /// Replace the content of an existing message.
    async fn edit_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        content: &MessageContent,
    ) -> Result<(), PlatformError>;

    /// React to a message as the service.
    async fn add_reaction(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        emoji: &str,
    ) -> Result<(), PlatformError>;

    /// Everyone who reacted to a message with `emoji`.
    async fn reaction_users(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        emoji: &str,
    ) -> Result<Vec<Participant>, PlatformError>;

    /// Give a role to a member.
    async fn assign_role(
        &self,
        tenant: &TenantId,
        user: &UserId,
        role: &RoleId,
    ) -> Result<(), PlatformError>;
}

/// Voice connection and audio streaming for one tenant at a time.
///
/// Completion of a stream started with [`VoiceGateway::play`] is reported back
/// out-of-band, carrying the same [`PlaybackToken`].
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    async fn voice_permissions(
        &self,
        tenant: &TenantId,
        channel: &ChannelId,
    ) -> Result<VoicePermissions, PlatformError>;

    /// Current occupants of a voice channel.
    async fn channel_members(
        &self,
        tenant: &TenantId,
        channel: &ChannelId,
    ) -> Result<Vec<Participant>, PlatformError>;

    async fn connect(&self, tenant: &TenantId, channel: &ChannelId) -> Result<(), PlatformError>;

    async fn move_to(&self, tenant: &TenantId, channel: &ChannelId) -> Result<(), PlatformError>;

    async fn disconnect(&self, tenant: &TenantId) -> Result<(), PlatformError>;

    /// Start streaming `stream_url`, replacing nothing; the caller stops first.
    async fn play(
        &self,
        tenant: &TenantId,
        stream_url: &str,
        token: PlaybackToken,
    ) -> Result<(), PlatformError>;

    async fn pause(&self, tenant: &TenantId) -> Result<(), PlatformError>;

    async fn resume(&self, tenant: &TenantId) -> Result<(), PlatformError>;

    /// Halt the current stream. Does not disconnect.
    async fn stop(&self, tenant: &TenantId) -> Result<(), PlatformError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_builder() {
        let embed = Embed::new("Server status", Color::GREEN)
            .with_field("Status", "Online")
            .with_wide_field("Online now", "alice, bob")
            .with_footer("footer");

        assert_eq!(embed.field("Status"), Some("Online"));
        assert!(!embed.fields[1].inline);
        assert_eq!(embed.field("Missing"), None);
    }

    #[test]
    fn test_voice_permissions_need_both() {
        let perms = VoicePermissions {
            connect: true,
            speak: false,
        };
        assert!(!perms.can_play());
    }

    #[test]
    fn test_message_content_serialization_skips_empty() {
        let json = serde_json::to_value(MessageContent::text("hi")).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "hi" }));
    }
}
