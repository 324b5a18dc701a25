use crate::models::{
    BlockSelectPayload, CollabError, CursorMovePayload, ServerEvent, TypingPayload,
};
use crate::state::AppState;
use crate::ws::session::RoomSession;

/// Cursor, selection, and typing events. No access check beyond being bound
/// to a room, nothing persisted, fire-and-forget fan-out to the peers.
pub async fn handle_cursor_message(
    state: &AppState,
    session: &RoomSession,
    payload: CursorMovePayload,
) -> Result<(), CollabError> {
    let page_id = session.page_id.ok_or(CollabError::NotInRoom)?;
    state
        .rooms
        .publish(
            page_id,
            &session.conn_id,
            ServerEvent::UserCursor {
                user_id: session.user.id,
                position: payload.position,
                block_id: payload.block_id,
            },
        )
        .await;
    Ok(())
}

pub async fn handle_select_message(
    state: &AppState,
    session: &RoomSession,
    payload: BlockSelectPayload,
) -> Result<(), CollabError> {
    let page_id = session.page_id.ok_or(CollabError::NotInRoom)?;
    state
        .rooms
        .publish(
            page_id,
            &session.conn_id,
            ServerEvent::BlockSelected {
                user_id: session.user.id,
                block_id: payload.block_id,
            },
        )
        .await;
    Ok(())
}

pub async fn handle_typing_message(
    state: &AppState,
    session: &RoomSession,
    payload: TypingPayload,
    typing: bool,
) -> Result<(), CollabError> {
    let page_id = session.page_id.ok_or(CollabError::NotInRoom)?;
    state
        .rooms
        .publish(
            page_id,
            &session.conn_id,
            ServerEvent::UserTyping {
                user_id: session.user.id,
                block_id: payload.block_id,
                typing,
            },
        )
        .await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::UserSummary;
    use serde_json::json;
    use uuid::Uuid;

    fn bound_session(page_id: Uuid) -> RoomSession {
        let mut session = RoomSession::new(UserSummary::new(Uuid::new_v4(), "ada"));
        session.page_id = Some(page_id);
        session
    }

    #[tokio::test]
    async fn cursor_is_fanned_out_to_room() {
        let state = AppState::new(Config::default());
        let page_id = Uuid::new_v4();
        let session = bound_session(page_id);
        let mut peer_rx = state.rooms.subscribe(page_id).await;

        handle_cursor_message(
            &state,
            &session,
            CursorMovePayload {
                position: json!({"x": 10, "y": 24}),
                block_id: Some("hero".to_string()),
            },
        )
        .await
        .unwrap();

        let msg = peer_rx.try_recv().unwrap();
        assert_eq!(msg.sender_id, session.conn_id);
        assert!(matches!(msg.event, ServerEvent::UserCursor { .. }));
    }

    #[tokio::test]
    async fn unbound_connection_is_rejected() {
        let state = AppState::new(Config::default());
        let session = RoomSession::new(UserSummary::new(Uuid::new_v4(), "ada"));

        let err = handle_select_message(
            &state,
            &session,
            BlockSelectPayload {
                block_id: "hero".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CollabError::NotInRoom));
    }

    #[tokio::test]
    async fn typing_flag_follows_event_kind() {
        let state = AppState::new(Config::default());
        let page_id = Uuid::new_v4();
        let session = bound_session(page_id);
        let mut peer_rx = state.rooms.subscribe(page_id).await;

        let payload = TypingPayload {
            block_id: "hero".to_string(),
        };
        handle_typing_message(&state, &session, payload.clone(), true)
            .await
            .unwrap();
        handle_typing_message(&state, &session, payload, false)
            .await
            .unwrap();

        assert!(matches!(
            peer_rx.try_recv().unwrap().event,
            ServerEvent::UserTyping { typing: true, .. }
        ));
        assert!(matches!(
            peer_rx.try_recv().unwrap().event,
            ServerEvent::UserTyping { typing: false, .. }
        ));
    }
}
