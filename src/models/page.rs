use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::Block;

/// Number of history snapshots retained per page, oldest evicted first.
pub const HISTORY_CAP: usize = 10;

/// Collaborator role, ordered `viewer < editor < admin`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Editor,
    Admin,
}

impl Role {
    pub fn rank(&self) -> u8 {
        match self {
            Role::Viewer => 1,
            Role::Editor => 2,
            Role::Admin => 3,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Viewer => write!(f, "viewer"),
            Role::Editor => write!(f, "editor"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Explicit access grant on a page. The owner needs no grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub user_id: Uuid,
    pub role: Role,
}

/// Immutable snapshot of a page taken before an accepted mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub version: i64,
    pub blocks: Vec<Block>,
    pub timestamp: DateTime<Utc>,
    pub author: Uuid,
    pub description: String,
}

/// A webpage project: an ordered, tree-structured block set plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: Uuid,
    pub title: String,
    pub blocks: Vec<Block>,
    pub version: i64,
    #[serde(default)]
    pub history: VecDeque<HistoryEntry>,
    #[serde(default)]
    pub settings: Map<String, Value>,
    pub owner: Uuid,
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
}

impl Page {
    pub fn new(owner: Uuid, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            blocks: Vec::new(),
            version: 1,
            history: VecDeque::new(),
            settings: Map::new(),
            owner,
            collaborators: Vec::new(),
        }
    }

    /// Role-based access check. The owner always passes; anyone else needs a
    /// collaborator entry whose role ranks at least `required`.
    pub fn has_access(&self, user_id: Uuid, required: Role) -> bool {
        if self.owner == user_id {
            return true;
        }
        self.collaborators
            .iter()
            .find(|c| c.user_id == user_id)
            .map(|c| c.role.rank() >= required.rank())
            .unwrap_or(false)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_collaborator(role: Role) -> (Page, Uuid) {
        let owner = Uuid::new_v4();
        let user = Uuid::new_v4();
        let mut page = Page::new(owner, "landing");
        page.collaborators.push(Collaborator {
            user_id: user,
            role,
        });
        (page, user)
    }

    #[test]
    fn role_order_is_total() {
        assert!(Role::Viewer.rank() < Role::Editor.rank());
        assert!(Role::Editor.rank() < Role::Admin.rank());
    }

    #[test]
    fn owner_always_has_admin_access() {
        let page = Page::new(Uuid::new_v4(), "home");
        assert!(page.has_access(page.owner, Role::Admin));
    }

    #[test]
    fn stranger_has_no_access() {
        let page = Page::new(Uuid::new_v4(), "home");
        assert!(!page.has_access(Uuid::new_v4(), Role::Viewer));
    }

    #[test]
    fn editor_passes_editor_but_not_admin() {
        let (page, user) = page_with_collaborator(Role::Editor);
        assert!(page.has_access(user, Role::Viewer));
        assert!(page.has_access(user, Role::Editor));
        assert!(!page.has_access(user, Role::Admin));
    }

    #[test]
    fn viewer_cannot_edit() {
        let (page, user) = page_with_collaborator(Role::Viewer);
        assert!(page.has_access(user, Role::Viewer));
        assert!(!page.has_access(user, Role::Editor));
    }

    #[test]
    fn page_json_roundtrip() {
        let (page, _) = page_with_collaborator(Role::Editor);
        let json = serde_json::to_string(&page).unwrap();
        let parsed: Page = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, page.id);
        assert_eq!(parsed.version, page.version);
        assert_eq!(parsed.collaborators.len(), 1);
    }
}
