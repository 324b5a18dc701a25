use crate::auth::access;
use crate::models::{
    CollabError, Role, ServerEvent, UpdateSettingsPayload, UpdateTitlePayload,
};
use crate::services::page_edit_service;
use crate::state::AppState;
use crate::ws::session::RoomSession;

/// Handle `update-page-settings`: editor access, merge, broadcast the merged
/// settings object.
pub async fn handle_settings_message(
    state: &AppState,
    session: &RoomSession,
    payload: UpdateSettingsPayload,
) -> Result<(), CollabError> {
    let mut page = state
        .store
        .find_page(payload.page_id)
        .await?
        .ok_or(CollabError::PageNotFound(payload.page_id))?;
    access::ensure_page_access(&page, session.user.id, Role::Editor)?;

    page_edit_service::apply_settings(&state.store, &mut page, payload.settings, session.user.id)
        .await?;

    state
        .rooms
        .publish(
            payload.page_id,
            &session.conn_id,
            ServerEvent::PageSettingsUpdated {
                settings: page.settings.clone(),
                updated_by: session.user.id,
            },
        )
        .await;
    Ok(())
}

/// Handle `update-page-title`.
pub async fn handle_title_message(
    state: &AppState,
    session: &RoomSession,
    payload: UpdateTitlePayload,
) -> Result<(), CollabError> {
    let mut page = state
        .store
        .find_page(payload.page_id)
        .await?
        .ok_or(CollabError::PageNotFound(payload.page_id))?;
    access::ensure_page_access(&page, session.user.id, Role::Editor)?;

    page_edit_service::apply_title(&state.store, &mut page, payload.title.clone(), session.user.id)
        .await?;

    state
        .rooms
        .publish(
            payload.page_id,
            &session.conn_id,
            ServerEvent::PageTitleUpdated {
                title: payload.title,
                updated_by: session.user.id,
            },
        )
        .await;
    Ok(())
}
