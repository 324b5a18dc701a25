use std::time::Duration;

use moka::sync::Cache;
use tracing::info;
use uuid::Uuid;

use crate::models::{CollabError, UserSummary};
use crate::store::PageStore;

/// Cache of resolved user summaries keyed by user id.
///
/// Resolved once at connection time and reused for presence payloads, so a
/// reconnect storm does not hammer the store. Entries idle out after five
/// minutes.
pub struct UserCtxCache {
    cache: Cache<Uuid, UserSummary>,
}

impl UserCtxCache {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(100_000)
                .time_to_idle(Duration::from_secs(5 * 60))
                .build(),
        }
    }

    pub async fn get_or_fetch(
        &self,
        store: &PageStore,
        user_id: Uuid,
    ) -> Result<UserSummary, CollabError> {
        if let Some(user) = self.cache.get(&user_id) {
            return Ok(user);
        }

        info!("User context cache miss for {}. Fetching from store.", user_id);
        let user = store
            .find_user(user_id)
            .await?
            .ok_or(CollabError::UserNotFound(user_id))?;
        self.cache.insert(user_id, user.clone());
        Ok(user)
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for UserCtxCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetches_and_caches() {
        let store = PageStore::new();
        let user = UserSummary::new(Uuid::new_v4(), "ada");
        store.insert_user(user.clone()).await;

        let cache = UserCtxCache::new();
        let fetched = cache.get_or_fetch(&store, user.id).await.unwrap();
        assert_eq!(fetched, user);

        // Second hit comes from the cache.
        cache.cache.run_pending_tasks();
        assert_eq!(cache.entry_count(), 1);
    }

    #[tokio::test]
    async fn unknown_user_is_an_error() {
        let store = PageStore::new();
        let cache = UserCtxCache::new();
        let err = cache.get_or_fetch(&store, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CollabError::UserNotFound(_)));
    }
}
