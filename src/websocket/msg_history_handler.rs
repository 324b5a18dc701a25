use crate::auth::access;
use crate::models::{CollabError, Role, ServerEvent, UndoRedoPayload};
use crate::services::page_edit_service;
use crate::state::AppState;
use crate::ws::session::RoomSession;

/// Handle `undo-redo`.
///
/// Editor access. A target version outside the retained history window is a
/// silent no-op: nothing changes and nothing is broadcast. On a hit the
/// restored block set and version are broadcast as `history-navigated`.
pub async fn handle_history_message(
    state: &AppState,
    session: &RoomSession,
    payload: UndoRedoPayload,
) -> Result<(), CollabError> {
    let mut page = state
        .store
        .find_page(payload.page_id)
        .await?
        .ok_or(CollabError::PageNotFound(payload.page_id))?;
    access::ensure_page_access(&page, session.user.id, Role::Editor)?;

    let navigated =
        page_edit_service::navigate_history(&state.store, &mut page, &payload.action, payload.version)
            .await?;

    if let Some(version) = navigated {
        state
            .rooms
            .publish(
                payload.page_id,
                &session.conn_id,
                ServerEvent::HistoryNavigated {
                    blocks: page.blocks.clone(),
                    version,
                    action: payload.action,
                },
            )
            .await;
    }
    Ok(())
}
