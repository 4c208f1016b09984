//! HTTP client for the platform bridge sidecar.
//!
//! The bridge owns the platform gateway session and voice connections; we talk
//! to it over a small REST surface and it posts events back to our API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BridgeConfig;
use crate::playback::PlaybackToken;
use crate::tenant::{ChannelId, MessageId, RoleId, TenantId, UserId};

use super::{ChatPlatform, MessageContent, Participant, PlatformError, VoiceGateway, VoicePermissions};

/// Bridge-backed implementation of [`ChatPlatform`] and [`VoiceGateway`].
pub struct BridgeClient {
    client: Client,
    config: BridgeConfig,
}

#[derive(Debug, Deserialize)]
struct CreatedMessage {
    id: MessageId,
}

#[derive(Debug, Serialize)]
struct ChannelBody<'a> {
    channel_id: &'a ChannelId,
}

#[derive(Debug, Serialize)]
struct PlayBody<'a> {
    stream_url: &'a str,
    token: PlaybackToken,
}

impl BridgeClient {
    pub fn new(config: BridgeConfig) -> Result<Self, PlatformError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PlatformError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, PlatformError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            if e.is_timeout() {
                PlatformError::Timeout
            } else if e.is_connect() {
                PlatformError::ConnectionFailed(e.to_string())
            } else {
                PlatformError::ApiError(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = body.chars().take(200).collect::<String>();
        Err(match status {
            StatusCode::NOT_FOUND => PlatformError::NotFound(detail),
            StatusCode::FORBIDDEN => PlatformError::Forbidden(detail),
            _ => PlatformError::ApiError(format!("HTTP {}: {}", status, detail)),
        })
    }

    async fn json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, PlatformError> {
        response
            .json::<T>()
            .await
            .map_err(|e| PlatformError::ApiError(format!("Invalid bridge response: {}", e)))
    }

    async fn voice_command(&self, tenant: &TenantId, action: &str) -> Result<(), PlatformError> {
        let url = self.url(&format!(
            "/tenants/{}/voice/{}",
            urlencoding::encode(tenant.as_str()),
            action
        ));
        self.send(self.client.post(&url)).await?;
        Ok(())
    }
}

fn reaction_path(channel: &ChannelId, message: &MessageId, emoji: &str) -> String {
    format!(
        "/channels/{}/messages/{}/reactions/{}",
        urlencoding::encode(channel.as_str()),
        urlencoding::encode(message.as_str()),
        urlencoding::encode(emoji)
    )
}

#[async_trait]
impl ChatPlatform for BridgeClient {
    async fn send_message(
        &self,
        channel: &ChannelId,
        content: &MessageContent,
    ) -> Result<MessageId, PlatformError> {
        let url = self.url(&format!(
            "/channels/{}/messages",
            urlencoding::encode(channel.as_str())
        ));
        let response = self.send(self.client.post(&url).json(content)).await?;
        let created: CreatedMessage = Self::json(response).await?;
        debug!("Posted message {} in channel {}", created.id, channel);
        Ok(created.id)
    }

    async fn edit_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        content: &MessageContent,
    ) -> Result<(), PlatformError> {
        let url = self.url(&format!(
            "/channels/{}/messages/{}",
            urlencoding::encode(channel.as_str()),
            urlencoding::encode(message.as_str())
        ));
        self.send(self.client.patch(&url).json(content)).await?;
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        emoji: &str,
    ) -> Result<(), PlatformError> {
        let url = self.url(&reaction_path(channel, message, emoji));
        self.send(self.client.put(&url)).await?;
        Ok(())
    }

    async fn reaction_users(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        emoji: &str,
    ) -> Result<Vec<Participant>, PlatformError> {
        let url = self.url(&reaction_path(channel, message, emoji));
        let response = self.send(self.client.get(&url)).await?;
        Self::json(response).await
    }

    async fn assign_role(
        &self,
        tenant: &TenantId,
        user: &UserId,
        role: &RoleId,
    ) -> Result<(), PlatformError> {
        let url = self.url(&format!(
            "/tenants/{}/members/{}/roles/{}",
            urlencoding::encode(tenant.as_str()),
            urlencoding::encode(user.as_str()),
            urlencoding::encode(role.as_str())
        ));
        self.send(self.client.put(&url)).await?;
        Ok(())
    }
}

#[async_trait]
impl VoiceGateway for BridgeClient {
    async fn voice_permissions(
        &self,
        tenant: &TenantId,
        channel: &ChannelId,
    ) -> Result<VoicePermissions, PlatformError> {
        let url = self.url(&format!(
            "/tenants/{}/voice/{}/permissions",
            urlencoding::encode(tenant.as_str()),
            urlencoding::encode(channel.as_str())
        ));
        let response = self.send(self.client.get(&url)).await?;
        Self::json(response).await
    }

    async fn channel_members(
        &self,
        tenant: &TenantId,
        channel: &ChannelId,
    ) -> Result<Vec<Participant>, PlatformError> {
        let url = self.url(&format!(
            "/tenants/{}/voice/{}/members",
            urlencoding::encode(tenant.as_str()),
            urlencoding::encode(channel.as_str())
        ));
        let response = self.send(self.client.get(&url)).await?;
        Self::json(response).await
    }

    async fn connect(&self, tenant: &TenantId, channel: &ChannelId) -> Result<(), PlatformError> {
        let url = self.url(&format!(
            "/tenants/{}/voice/connect",
            urlencoding::encode(tenant.as_str())
        ));
        self.send(
            self.client
                .post(&url)
                .json(&ChannelBody { channel_id: channel }),
        )
        .await?;
        Ok(())
    }

    async fn move_to(&self, tenant: &TenantId, channel: &ChannelId) -> Result<(), PlatformError> {
        let url = self.url(&format!(
            "/tenants/{}/voice/move",
            urlencoding::encode(tenant.as_str())
        ));
        self.send(
            self.client
                .post(&url)
                .json(&ChannelBody { channel_id: channel }),
        )
        .await?;
        Ok(())
    }

    async fn disconnect(&self, tenant: &TenantId) -> Result<(), PlatformError> {
        self.voice_command(tenant, "disconnect").await
    }

    async fn play(
        &self,
        tenant: &TenantId,
        stream_url: &str,
        token: PlaybackToken,
    ) -> Result<(), PlatformError> {
        let url = self.url(&format!(
            "/tenants/{}/voice/play",
            urlencoding::encode(tenant.as_str())
        ));
        self.send(
            self.client
                .post(&url)
                .json(&PlayBody { stream_url, token }),
        )
        .await?;
        Ok(())
    }

    async fn pause(&self, tenant: &TenantId) -> Result<(), PlatformError> {
        self.voice_command(tenant, "pause").await
    }

    async fn resume(&self, tenant: &TenantId) -> Result<(), PlatformError> {
        self.voice_command(tenant, "resume").await
    }

    async fn stop(&self, tenant: &TenantId) -> Result<(), PlatformError> {
        self.voice_command(tenant, "stop").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> BridgeClient {
        BridgeClient::new(BridgeConfig {
            url: url.to_string(),
            token: None,
            timeout_secs: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let bridge = client("http://bridge:7070/");
        assert_eq!(bridge.url("/channels/1/messages"), "http://bridge:7070/channels/1/messages");
    }

    #[test]
    fn test_reaction_path_encodes_emoji() {
        let path = reaction_path(&ChannelId::from("c"), &MessageId::from("m"), "🎉");
        assert_eq!(path, "/channels/c/messages/m/reactions/%F0%9F%8E%89");
    }

    #[tokio::test]
    async fn test_unreachable_bridge_is_connection_error() {
        let bridge = client("http://127.0.0.1:9");
        let result = bridge
            .send_message(&ChannelId::from("c"), &MessageContent::text("hi"))
            .await;
        assert!(matches!(
            result,
            Err(PlatformError::ConnectionFailed(_))
                | Err(PlatformError::Timeout)
                | Err(PlatformError::ApiError(_))
        ));
    }
}
