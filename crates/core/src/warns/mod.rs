//! Append-only warning records per tenant member.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::store::{StoreError, TenantSettings, WarnRecord};
use crate::tenant::{TenantId, UserId};

/// Warning count at which the command layer should raise an escalation notice.
pub const ESCALATION_THRESHOLD: usize = 3;

pub fn needs_escalation(count: usize) -> bool {
    count >= ESCALATION_THRESHOLD
}

/// Warnings stored in the tenant settings document.
pub struct WarnBook {
    settings: Arc<TenantSettings>,
}

impl WarnBook {
    pub fn new(settings: Arc<TenantSettings>) -> Self {
        Self { settings }
    }

    /// Record a warning and return the user's new total.
    pub async fn add_warn(
        &self,
        tenant: &TenantId,
        user: &UserId,
        reason: &str,
    ) -> Result<usize, StoreError> {
        let record = WarnRecord {
            reason: reason.to_string(),
            issued_at: Utc::now(),
        };
        let count = self
            .settings
            .update(tenant, |config| {
                let warns = config.warns.entry(user.clone()).or_default();
                warns.push(record);
                warns.len()
            })
            .await?;

        info!("Tenant {}: warned {} ({} total)", tenant, user, count);
        Ok(count)
    }

    /// A user's warnings, oldest first.
    pub fn list(&self, tenant: &TenantId, user: &UserId) -> Vec<WarnRecord> {
        self.settings
            .get(tenant)
            .warns
            .get(user)
            .cloned()
            .unwrap_or_default()
    }

    /// Drop all of a user's warnings. Returns how many were removed.
    pub async fn clear(&self, tenant: &TenantId, user: &UserId) -> Result<usize, StoreError> {
        let removed = self
            .settings
            .update(tenant, |config| {
                config.warns.remove(user).map(|w| w.len()).unwrap_or(0)
            })
            .await?;

        info!("Tenant {}: cleared {} warnings of {}", tenant, removed, user);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryConfigStore;

    fn book() -> (WarnBook, Arc<MemoryConfigStore>) {
        let store = Arc::new(MemoryConfigStore::new());
        let settings = Arc::new(TenantSettings::load(store.clone()).unwrap());
        (WarnBook::new(settings), store)
    }

    #[tokio::test]
    async fn test_add_returns_running_count() {
        let (book, store) = book();
        let tenant = TenantId::from("t1");
        let user = UserId::from("u1");

        assert_eq!(book.add_warn(&tenant, &user, "spam").await.unwrap(), 1);
        assert_eq!(book.add_warn(&tenant, &user, "insults").await.unwrap(), 2);
        assert_eq!(
            book.add_warn(&tenant, &UserId::from("u2"), "spam").await.unwrap(),
            1
        );

        let reasons: Vec<_> = book
            .list(&tenant, &user)
            .into_iter()
            .map(|w| w.reason)
            .collect();
        assert_eq!(reasons, vec!["spam", "insults"]);
        assert_eq!(store.save_count(), 3);
    }

    #[tokio::test]
    async fn test_clear_removes_only_that_user() {
        let (book, _) = book();
        let tenant = TenantId::from("t1");
        let user = UserId::from("u1");
        let other = UserId::from("u2");
        book.add_warn(&tenant, &user, "a").await.unwrap();
        book.add_warn(&tenant, &user, "b").await.unwrap();
        book.add_warn(&tenant, &other, "c").await.unwrap();

        assert_eq!(book.clear(&tenant, &user).await.unwrap(), 2);
        assert!(book.list(&tenant, &user).is_empty());
        assert_eq!(book.list(&tenant, &other).len(), 1);
        assert_eq!(book.clear(&tenant, &user).await.unwrap(), 0);
    }

    #[test]
    fn test_escalation_threshold() {
        assert!(!needs_escalation(2));
        assert!(needs_escalation(3));
        assert!(needs_escalation(4));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_warns() {
        let (book, store) = book();
        let tenant = TenantId::from("t1");
        let user = UserId::from("u1");
        book.add_warn(&tenant, &user, "a").await.unwrap();

        store.fail_next_save();
        assert!(book.add_warn(&tenant, &user, "b").await.is_err());
        assert_eq!(book.list(&tenant, &user).len(), 1);
    }
}
