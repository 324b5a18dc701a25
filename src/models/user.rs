use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The user fields shared with other editors in a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl UserSummary {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar: None,
        }
    }
}
