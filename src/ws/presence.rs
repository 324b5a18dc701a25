use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{ActiveUser, UserSummary};

/// Tracks which users are actively viewing each page.
///
/// Process-local and non-durable: rebuilt empty on restart, and allowed to
/// lag reality until the transport fires a disconnect for a crashed client.
/// Constructed once per process and injected into the protocol handler.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    inner: RwLock<HashMap<Uuid, HashMap<Uuid, ActiveUser>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or overwrite) the presence entry for a user on a page.
    pub async fn join(&self, page_id: Uuid, user: UserSummary) {
        debug!("Presence join: user {} on page {}", user.id, page_id);
        let mut inner = self.inner.write().await;
        inner.entry(page_id).or_default().insert(
            user.id,
            ActiveUser {
                user,
                joined_at: Utc::now(),
            },
        );
    }

    /// Remove a user's entry; drops the page map when it empties so idle
    /// rooms do not accumulate.
    pub async fn leave(&self, page_id: Uuid, user_id: Uuid) {
        debug!("Presence leave: user {} on page {}", user_id, page_id);
        let mut inner = self.inner.write().await;
        if let Some(room) = inner.get_mut(&page_id) {
            room.remove(&user_id);
            if room.is_empty() {
                inner.remove(&page_id);
            }
        }
    }

    /// Everyone currently on a page. Empty when the page has no map.
    pub async fn list_active(&self, page_id: Uuid) -> Vec<ActiveUser> {
        self.inner
            .read()
            .await
            .get(&page_id)
            .map(|room| room.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Total presence entries across all pages, for diagnostics.
    pub async fn entry_count(&self) -> usize {
        self.inner.read().await.values().map(|m| m.len()).sum()
    }
}
