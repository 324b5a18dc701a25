use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Role;

/// Response for an error
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: u16,
    pub status: String,
    pub error: String,
}

/// Errors raised by the collaboration core.
///
/// Mutating handlers are all-or-nothing: when one of these comes back, no
/// state changed, nothing was broadcast, and only the originating connection
/// is told via an `error` event.
#[derive(Debug, Error, Clone)]
pub enum CollabError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("page not found: {0}")]
    PageNotFound(Uuid),
    #[error("user not found: {0}")]
    UserNotFound(Uuid),
    #[error("access denied: {0} role required")]
    AccessDenied(Role),
    #[error("invalid block structure: {0}")]
    InvalidBlocks(String),
    #[error("not joined to a page")]
    NotInRoom,
    #[error("store error: {0}")]
    Store(String),
}
