use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{CollabError, Page, UserSummary};

/// Document and user store.
///
/// This is the persistence collaborator the collaboration core talks to.
/// Pages are cloned out on read and written back whole on save, so two
/// concurrent read-modify-write cycles keep last-writer-wins semantics:
/// the later `save_page` wins outright. The core deliberately does not
/// lock around this (see the protocol handler).
#[derive(Debug, Default)]
pub struct PageStore {
    pages: RwLock<HashMap<Uuid, Page>>,
    users: RwLock<HashMap<Uuid, UserSummary>>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn find_page(&self, id: Uuid) -> Result<Option<Page>, CollabError> {
        Ok(self.pages.read().await.get(&id).cloned())
    }

    pub async fn save_page(&self, page: &Page) -> Result<(), CollabError> {
        debug!("Saving page {} at version {}", page.id, page.version);
        self.pages.write().await.insert(page.id, page.clone());
        Ok(())
    }

    pub async fn find_user(&self, id: Uuid) -> Result<Option<UserSummary>, CollabError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    pub async fn insert_user(&self, user: UserSummary) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn page_count(&self) -> usize {
        self.pages.read().await.len()
    }
}
