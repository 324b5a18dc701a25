use crate::auth::access;
use crate::models::{validate_blocks, CollabError, Role, ServerEvent, UpdateBlocksPayload};
use crate::services::page_edit_service;
use crate::state::AppState;
use crate::ws::session::RoomSession;

/// Handle `update-blocks`.
///
/// Requires editor access. The new block set is validated as a tree before
/// anything mutates; the snapshot/apply/persist unit lives in the edit
/// service. On success the full new block set is broadcast to everyone else
/// in the page's room.
pub async fn handle_update_blocks_message(
    state: &AppState,
    session: &RoomSession,
    payload: UpdateBlocksPayload,
) -> Result<(), CollabError> {
    let mut page = state
        .store
        .find_page(payload.page_id)
        .await?
        .ok_or(CollabError::PageNotFound(payload.page_id))?;
    access::ensure_page_access(&page, session.user.id, Role::Editor)?;
    validate_blocks(&payload.blocks)?;

    page_edit_service::apply_blocks(
        &state.store,
        &mut page,
        payload.blocks,
        session.user.id,
        &payload.change_type,
    )
    .await?;

    state
        .rooms
        .publish(
            payload.page_id,
            &session.conn_id,
            ServerEvent::BlocksUpdated {
                blocks: page.blocks.clone(),
                version: page.version,
                updated_by: session.user.id,
                change_type: payload.change_type,
                block_id: payload.block_id,
            },
        )
        .await;
    Ok(())
}
