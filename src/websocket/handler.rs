use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::models::{BroadcastMessage, ClientEvent, CollabError, ServerEvent, UserSummary};
use crate::services::auth_service;
use crate::state::AppState;
use crate::websocket::{
    msg_blocks_handler::handle_update_blocks_message,
    msg_ephemeral_handler::{handle_cursor_message, handle_select_message, handle_typing_message},
    msg_history_handler::handle_history_message,
    msg_join_handler::{authorize_join, join_room, leave_room},
    msg_settings_handler::{handle_settings_message, handle_title_message},
};
use crate::ws::session::RoomSession;

type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// WebSocket handler.
///
/// Authentication happens exactly once, here, before the upgrade: the
/// credential token comes from the `token` query parameter, the
/// Authorization header, or the auth cookie. A missing or invalid token
/// rejects the connection before any event is accepted.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    info!("New WebSocket connection attempt");

    let Some(secret) = state.config.auth_jwt_secret.clone() else {
        error!("Auth JWT secret not configured; rejecting connection");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let token = params
        .get("token")
        .cloned()
        .or_else(|| auth_service::token_from_headers(&headers));
    let Some(token) = token else {
        warn!("WebSocket connection without credential token rejected");
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let ctx = match auth_service::auth_ctx_from_token(&token, &secret) {
        Ok(ctx) => ctx,
        Err(e) => {
            warn!("WebSocket handshake auth failed: {}", e);
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    let user = match state.user_ctx.get_or_fetch(&state.store, ctx.user_id).await {
        Ok(user) => user,
        Err(e) => {
            warn!("Unknown user on WebSocket handshake: {}", e);
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, user, state))
}

/// Handle an authenticated WebSocket connection.
///
/// Events from this connection are processed to completion in arrival
/// order. Broadcasts from the bound room arrive on a separate forward task
/// that filters out this connection's own messages.
async fn handle_socket(socket: WebSocket, user: UserSummary, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();
    let sender: WsSender = Arc::new(Mutex::new(sender));

    let mut session = RoomSession::new(user);
    info!(
        "WebSocket connection established: conn_id={} user={}",
        session.conn_id, session.user.id
    );

    // Forwards broadcasts from the currently bound room; swapped on join.
    let mut forward_task: Option<JoinHandle<()>> = None;

    while let Some(Ok(frame)) = receiver.next().await {
        let msg = match classify_frame(frame) {
            Inbound::Event(text) => text,
            Inbound::Skip => continue,
            Inbound::Closed => break,
        };
        let event: ClientEvent = match serde_json::from_str(&msg) {
            Ok(event) => event,
            Err(e) => {
                error!("Failed to parse event on {}: {}", session.conn_id, e);
                send_event(
                    &sender,
                    &ServerEvent::Error {
                        message: "malformed event".to_string(),
                    },
                )
                .await;
                continue;
            }
        };

        if let Err(err) =
            dispatch_event(&state, &mut session, &sender, &mut forward_task, event).await
        {
            warn!("Event on {} rejected: {}", session.conn_id, err);
            send_event(
                &sender,
                &ServerEvent::Error {
                    message: err.to_string(),
                },
            )
            .await;
        }
    }

    // Disconnect: stop forwarding, then run the leave transition so the
    // remaining room members get their departure notice. Awaiting the abort
    // drops the receiver first, letting the leave prune an emptied room.
    if let Some(task) = forward_task.take() {
        task.abort();
        let _ = task.await;
    }
    leave_room(&state, &mut session).await;
    info!("WebSocket connection terminated: conn_id={}", session.conn_id);
}

enum Inbound {
    Event(String),
    Skip,
    Closed,
}

/// Only text frames carry protocol events. Pings and pongs are answered at
/// the transport layer and binary frames carry nothing we speak, so neither
/// ends the session; only a close frame does.
fn classify_frame(frame: Message) -> Inbound {
    match frame {
        Message::Text(text) => Inbound::Event(text),
        Message::Close(_) => Inbound::Closed,
        Message::Ping(_) | Message::Pong(_) | Message::Binary(_) => Inbound::Skip,
    }
}

/// Single dispatch point over the inbound event union. Every handler follows
/// the same template: check access, mutate where applicable, broadcast to
/// the room minus the sender.
async fn dispatch_event(
    state: &AppState,
    session: &mut RoomSession,
    sender: &WsSender,
    forward_task: &mut Option<JoinHandle<()>>,
    event: ClientEvent,
) -> Result<(), CollabError> {
    match event {
        ClientEvent::JoinPage(payload) => {
            authorize_join(state, session, &payload).await?;
            // Tear down the old room's relay before the leave transition:
            // awaiting the aborted task drops its broadcast receiver, so the
            // prune in the leave path can close an emptied room and no
            // old-room traffic is relayed past the departure notice.
            if let Some(task) = forward_task.take() {
                task.abort();
                let _ = task.await;
            }
            let (snapshot, rx) = join_room(state, session, payload.page_id).await;
            *forward_task = Some(spawn_forward_task(
                rx,
                sender.clone(),
                session.conn_id.clone(),
            ));
            send_event(sender, &snapshot).await;
            Ok(())
        }
        ClientEvent::UpdateBlocks(payload) => {
            handle_update_blocks_message(state, session, payload).await
        }
        ClientEvent::CursorMove(payload) => handle_cursor_message(state, session, payload).await,
        ClientEvent::BlockSelect(payload) => handle_select_message(state, session, payload).await,
        ClientEvent::TypingStart(payload) => {
            handle_typing_message(state, session, payload, true).await
        }
        ClientEvent::TypingStop(payload) => {
            handle_typing_message(state, session, payload, false).await
        }
        ClientEvent::UpdatePageSettings(payload) => {
            handle_settings_message(state, session, payload).await
        }
        ClientEvent::UpdatePageTitle(payload) => {
            handle_title_message(state, session, payload).await
        }
        ClientEvent::UndoRedo(payload) => handle_history_message(state, session, payload).await,
    }
}

/// Monitor the room's broadcast channel and relay to this client, skipping
/// messages this connection originated to prevent echo.
fn spawn_forward_task(
    mut rx: broadcast::Receiver<BroadcastMessage>,
    sender: WsSender,
    conn_id: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Ok(broadcast_msg) = rx.recv().await {
            if broadcast_msg.sender_id == conn_id {
                continue;
            }
            let text = match serde_json::to_string(&broadcast_msg.event) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize broadcast for {}: {}", conn_id, e);
                    continue;
                }
            };
            if sender.lock().await.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    })
}

async fn send_event(sender: &WsSender, event: &ServerEvent) {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to serialize event: {}", e);
            return;
        }
    };
    if sender.lock().await.send(Message::Text(text)).await.is_err() {
        warn!("Failed to deliver event to client");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_and_binary_frames_do_not_end_the_session() {
        assert!(matches!(classify_frame(Message::Ping(vec![1])), Inbound::Skip));
        assert!(matches!(classify_frame(Message::Pong(vec![])), Inbound::Skip));
        assert!(matches!(
            classify_frame(Message::Binary(vec![0xde, 0xad])),
            Inbound::Skip
        ));
        assert!(matches!(classify_frame(Message::Close(None)), Inbound::Closed));
        assert!(matches!(
            classify_frame(Message::Text("{}".to_string())),
            Inbound::Event(text) if text == "{}"
        ));
    }
}
