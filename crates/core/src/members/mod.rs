//! Member join/leave handling: auto role and announcements.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::platform::{bounded, ChatPlatform, Color, Embed, MessageContent, Participant};
use crate::store::{Announcement, StoreError, TenantSettings};
use crate::tenant::{RoleId, TenantId};

/// Which announcement a setting applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementKind {
    Join,
    Leave,
}

/// What a join event did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub role_assigned: bool,
    pub announced: bool,
}

/// Fill an announcement template. `{member}` becomes `member_text`, `{name}` the display name.
pub fn fill_template(template: &str, member_text: &str, name: &str) -> String {
    template
        .replace("{member}", member_text)
        .replace("{name}", name)
}

pub struct MemberEvents {
    settings: Arc<TenantSettings>,
    platform: Arc<dyn ChatPlatform>,
    call_timeout: Duration,
}

impl MemberEvents {
    pub fn new(
        settings: Arc<TenantSettings>,
        platform: Arc<dyn ChatPlatform>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            settings,
            platform,
            call_timeout,
        }
    }

    /// Give the auto role and post the welcome. Failures are logged, not returned.
    pub async fn on_member_joined(&self, tenant: &TenantId, member: &Participant) -> JoinReport {
        let config = self.settings.get(tenant);
        let mut report = JoinReport::default();

        if let Some(role) = &config.auto_role_id {
            match bounded(
                self.call_timeout,
                self.platform.assign_role(tenant, &member.user_id, role),
            )
            .await
            {
                Ok(()) => {
                    debug!("Tenant {}: auto role {} given to {}", tenant, role, member.user_id);
                    report.role_assigned = true;
                }
                Err(e) => warn!(
                    "Tenant {}: failed to assign auto role {} to {}: {}",
                    tenant, role, member.user_id, e
                ),
            }
        }

        if let Some(announcement) = &config.join_announcement {
            let text = fill_template(
                &announcement.message,
                &member.user_id.mention(),
                &member.display_name,
            );
            let embed = Embed::new("Welcome!", Color::GREEN).with_description(text);
            report.announced = self.announce(tenant, announcement, embed).await;
        }

        report
    }

    /// Post the goodbye. Returns whether it was posted.
    pub async fn on_member_left(&self, tenant: &TenantId, member: &Participant) -> bool {
        let Some(announcement) = self.settings.get(tenant).leave_announcement else {
            return false;
        };
        // The member is gone, so mentions would not resolve.
        let text = fill_template(
            &announcement.message,
            &member.display_name,
            &member.display_name,
        );
        let embed = Embed::new("Goodbye!", Color::RED).with_description(text);
        self.announce(tenant, &announcement, embed).await
    }

    async fn announce(&self, tenant: &TenantId, announcement: &Announcement, embed: Embed) -> bool {
        match bounded(
            self.call_timeout,
            self.platform
                .send_message(&announcement.channel_id, &MessageContent::embed(embed)),
        )
        .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    "Tenant {}: failed to post announcement in {}: {}",
                    tenant, announcement.channel_id, e
                );
                false
            }
        }
    }

    pub async fn set_auto_role(
        &self,
        tenant: &TenantId,
        role: Option<RoleId>,
    ) -> Result<(), StoreError> {
        self.settings
            .update(tenant, |config| config.auto_role_id = role)
            .await
    }

    pub async fn set_announcement(
        &self,
        tenant: &TenantId,
        kind: AnnouncementKind,
        announcement: Option<Announcement>,
    ) -> Result<(), StoreError> {
        self.settings
            .update(tenant, |config| match kind {
                AnnouncementKind::Join => config.join_announcement = announcement,
                AnnouncementKind::Leave => config.leave_announcement = announcement,
            })
            .await
    }
}
