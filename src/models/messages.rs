use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::{Block, UserSummary};

/// Inbound events, client to server. Tagged by event name.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinPage(JoinPagePayload),
    UpdateBlocks(UpdateBlocksPayload),
    CursorMove(CursorMovePayload),
    BlockSelect(BlockSelectPayload),
    TypingStart(TypingPayload),
    TypingStop(TypingPayload),
    UpdatePageSettings(UpdateSettingsPayload),
    UpdatePageTitle(UpdateTitlePayload),
    UndoRedo(UndoRedoPayload),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JoinPagePayload {
    pub page_id: Uuid,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlocksPayload {
    pub page_id: Uuid,
    pub blocks: Vec<Block>,
    pub change_type: String,
    #[serde(default)]
    pub block_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CursorMovePayload {
    pub position: Value,
    #[serde(default)]
    pub block_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BlockSelectPayload {
    pub block_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub block_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsPayload {
    pub page_id: Uuid,
    pub settings: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTitlePayload {
    pub page_id: Uuid,
    pub title: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UndoRedoPayload {
    pub page_id: Uuid,
    /// "undo", "redo", or anything else to jump to `version` directly.
    pub action: String,
    #[serde(default)]
    pub version: Option<i64>,
}

/// A presence entry as sent to clients.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUser {
    pub user: UserSummary,
    pub joined_at: DateTime<Utc>,
}

/// Outbound events, server to clients. Tagged by event name; payload fields
/// are camelCase to match the client protocol.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    ActiveUsers { users: Vec<ActiveUser> },
    #[serde(rename_all = "camelCase")]
    UserJoined { user: UserSummary },
    #[serde(rename_all = "camelCase")]
    UserLeft { user_id: Uuid },
    #[serde(rename_all = "camelCase")]
    BlocksUpdated {
        blocks: Vec<Block>,
        version: i64,
        updated_by: Uuid,
        change_type: String,
        block_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    UserCursor {
        user_id: Uuid,
        position: Value,
        block_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    BlockSelected { user_id: Uuid, block_id: String },
    #[serde(rename_all = "camelCase")]
    UserTyping {
        user_id: Uuid,
        block_id: String,
        typing: bool,
    },
    #[serde(rename_all = "camelCase")]
    PageSettingsUpdated {
        settings: Map<String, Value>,
        updated_by: Uuid,
    },
    #[serde(rename_all = "camelCase")]
    PageTitleUpdated { title: String, updated_by: Uuid },
    #[serde(rename_all = "camelCase")]
    HistoryNavigated {
        blocks: Vec<Block>,
        version: i64,
        action: String,
    },
    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

/// Envelope carried on a room's broadcast channel. The `sender_id` is the
/// originating connection id; every subscriber filters its own id out so a
/// client never receives its own broadcast back.
#[derive(Debug, Clone)]
pub struct BroadcastMessage {
    pub sender_id: String,
    pub event: ServerEvent,
}
