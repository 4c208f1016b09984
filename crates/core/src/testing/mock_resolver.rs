//! Mock media resolver for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::media::{MediaError, MediaResolver, ResolvedMedia};

/// Mock implementation of the MediaResolver trait.
///
/// Resolves only queries registered with [`MockResolver::add`]; anything else
/// is `NotFound`.
#[derive(Default)]
pub struct MockResolver {
    known: Arc<RwLock<HashMap<String, ResolvedMedia>>>,
    queries: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<MediaError>>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, query: &str, media: ResolvedMedia) {
        self.known.write().await.insert(query.to_string(), media);
    }

    /// Configure the next resolution to fail with the given error.
    pub async fn set_next_error(&self, error: MediaError) {
        *self.next_error.write().await = Some(error);
    }

    /// Every query received, in order.
    pub async fn queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }
}

#[async_trait]
impl MediaResolver for MockResolver {
    async fn resolve(&self, query: &str) -> Result<ResolvedMedia, MediaError> {
        self.queries.write().await.push(query.to_string());
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        self.known
            .read()
            .await
            .get(query)
            .cloned()
            .ok_or_else(|| MediaError::NotFound(query.to_string()))
    }
}
