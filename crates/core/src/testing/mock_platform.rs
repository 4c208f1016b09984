//! Mock chat platform for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::platform::{ChatPlatform, MessageContent, Participant, PlatformError};
use crate::tenant::{ChannelId, MessageId, RoleId, TenantId, UserId};

/// A message posted through the mock.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub channel: ChannelId,
    pub message_id: MessageId,
    pub content: MessageContent,
}

/// An edit applied through the mock.
#[derive(Debug, Clone)]
pub struct EditedMessage {
    pub channel: ChannelId,
    pub message_id: MessageId,
    pub content: MessageContent,
}

/// Mock implementation of the ChatPlatform trait.
///
/// Provides controllable behavior for testing:
/// - Records every sent message, edit, reaction and role assignment
/// - Simulates externally deleted messages (edits then fail with NotFound)
/// - Serves configured reaction lists
/// - Injects one-shot or persistent failures
///
/// # Example
///
/// ```rust,ignore
/// use steward_core::testing::{MockPlatform, fixtures};
///
/// let platform = MockPlatform::new();
/// let id = platform.send_message(&channel, &MessageContent::text("hi")).await?;
///
/// // The message disappears on the platform side.
/// platform.delete_message(&id).await;
/// assert!(platform.edit_message(&channel, &id, &content).await.is_err());
/// ```
#[derive(Default)]
pub struct MockPlatform {
    sent: Arc<RwLock<Vec<SentMessage>>>,
    edits: Arc<RwLock<Vec<EditedMessage>>>,
    deleted: Arc<RwLock<HashSet<MessageId>>>,
    reactions: Arc<RwLock<HashMap<(MessageId, String), Vec<Participant>>>>,
    added_reactions: Arc<RwLock<Vec<(MessageId, String)>>>,
    roles: Arc<RwLock<Vec<(UserId, RoleId)>>>,
    next_send_error: Arc<RwLock<Option<PlatformError>>>,
    next_role_error: Arc<RwLock<Option<PlatformError>>>,
    fail_edits: Arc<RwLock<bool>>,
    fail_reactions: Arc<RwLock<bool>>,
    counter: Arc<RwLock<u64>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages posted so far, oldest first.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.read().await.clone()
    }

    /// All successful edits, oldest first.
    pub async fn edited_messages(&self) -> Vec<EditedMessage> {
        self.edits.read().await.clone()
    }

    /// Simulate a message removed by someone on the platform.
    pub async fn delete_message(&self, message: &MessageId) {
        self.deleted.write().await.insert(message.clone());
    }

    /// Make every edit fail.
    pub async fn fail_edits(&self, fail: bool) {
        *self.fail_edits.write().await = fail;
    }

    /// Configure the next send to fail with the given error.
    pub async fn fail_next_send(&self, error: PlatformError) {
        *self.next_send_error.write().await = Some(error);
    }

    /// Configure the next role assignment to fail with the given error.
    pub async fn fail_next_role(&self, error: PlatformError) {
        *self.next_role_error.write().await = Some(error);
    }

    /// Users reacting to `message` with `emoji`.
    pub async fn set_reactions(&self, message: &MessageId, emoji: &str, users: Vec<Participant>) {
        self.reactions
            .write()
            .await
            .insert((message.clone(), emoji.to_string()), users);
    }

    /// Make reaction lookups fail.
    pub async fn fail_reactions(&self, fail: bool) {
        *self.fail_reactions.write().await = fail;
    }

    /// Reactions added by the service.
    pub async fn added_reactions(&self) -> Vec<(MessageId, String)> {
        self.added_reactions.read().await.clone()
    }

    /// Roles assigned so far.
    pub async fn assigned_roles(&self) -> Vec<(UserId, RoleId)> {
        self.roles.read().await.clone()
    }

    async fn next_message_id(&self) -> MessageId {
        let mut counter = self.counter.write().await;
        *counter += 1;
        MessageId::new(format!("msg-{}", *counter))
    }

    async fn exists(&self, message: &MessageId) -> bool {
        !self.deleted.read().await.contains(message)
            && self
                .sent
                .read()
                .await
                .iter()
                .any(|m| &m.message_id == message)
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    async fn send_message(
        &self,
        channel: &ChannelId,
        content: &MessageContent,
    ) -> Result<MessageId, PlatformError> {
        if let Some(error) = self.next_send_error.write().await.take() {
            return Err(error);
        }

        let message_id = self.next_message_id().await;
        self.sent.write().await.push(SentMessage {
            channel: channel.clone(),
            message_id: message_id.clone(),
            content: content.clone(),
        });
        Ok(message_id)
    }

    async fn edit_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        content: &MessageContent,
    ) -> Result<(), PlatformError> {
        if *self.fail_edits.read().await {
            return Err(PlatformError::ApiError("edit rejected".to_string()));
        }
        if !self.exists(message).await {
            return Err(PlatformError::NotFound(format!("message {}", message)));
        }

        self.edits.write().await.push(EditedMessage {
            channel: channel.clone(),
            message_id: message.clone(),
            content: content.clone(),
        });
        Ok(())
    }

    async fn add_reaction(
        &self,
        _channel: &ChannelId,
        message: &MessageId,
        emoji: &str,
    ) -> Result<(), PlatformError> {
        if !self.exists(message).await {
            return Err(PlatformError::NotFound(format!("message {}", message)));
        }
        self.added_reactions
            .write()
            .await
            .push((message.clone(), emoji.to_string()));
        Ok(())
    }

    async fn reaction_users(
        &self,
        _channel: &ChannelId,
        message: &MessageId,
        emoji: &str,
    ) -> Result<Vec<Participant>, PlatformError> {
        if *self.fail_reactions.read().await {
            return Err(PlatformError::ApiError("reactions unavailable".to_string()));
        }
        Ok(self
            .reactions
            .read()
            .await
            .get(&(message.clone(), emoji.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn assign_role(
        &self,
        _tenant: &TenantId,
        user: &UserId,
        role: &RoleId,
    ) -> Result<(), PlatformError> {
        if let Some(error) = self.next_role_error.write().await.take() {
            return Err(error);
        }
        self.roles.write().await.push((user.clone(), role.clone()));
        Ok(())
    }
}
