use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use crate::auth::access;
use crate::models::{BroadcastMessage, CollabError, JoinPagePayload, Role, ServerEvent};
use crate::state::AppState;
use crate::ws::session::RoomSession;

/// Verify the page exists and the joiner holds at least viewer access.
///
/// Runs before any transition, so a failed join leaves the current binding
/// and its broadcast relay untouched. The socket loop calls this first, then
/// tears down its forward task for the old room, then commits via
/// [`join_room`]; the teardown must happen between the two so the old room's
/// channel can be pruned once this connection's receiver is gone.
pub async fn authorize_join(
    state: &AppState,
    session: &RoomSession,
    payload: &JoinPagePayload,
) -> Result<(), CollabError> {
    let page = state
        .store
        .find_page(payload.page_id)
        .await?
        .ok_or(CollabError::PageNotFound(payload.page_id))?;
    access::ensure_page_access(&page, session.user.id, Role::Viewer)
}

/// Commit an authorized join.
///
/// When switching pages, the leave path (presence removal, `user-left`
/// notice, channel prune) completes before the new binding is made: the
/// connection is never counted in two rooms at once, and the old room's
/// departure notice always precedes the new room's join notice. Re-joining
/// the already-bound page is a presence refresh and publishes no notice.
///
/// Returns the `active-users` snapshot for the joiner and the broadcast
/// receiver for the room; the socket loop swaps its forward task onto it.
pub async fn join_room(
    state: &AppState,
    session: &mut RoomSession,
    page_id: Uuid,
) -> (ServerEvent, broadcast::Receiver<BroadcastMessage>) {
    let rebind = session.is_bound_to(page_id);
    if !rebind {
        leave_room(state, session).await;
    }

    let receiver = state.rooms.subscribe(page_id).await;
    session.page_id = Some(page_id);
    state.presence.join(page_id, session.user.clone()).await;
    if !rebind {
        state
            .rooms
            .publish(
                page_id,
                &session.conn_id,
                ServerEvent::UserJoined {
                    user: session.user.clone(),
                },
            )
            .await;
        info!(
            "User {} joined page {} (conn {})",
            session.user.id, page_id, session.conn_id
        );
    }

    let users = state.presence.list_active(page_id).await;
    (ServerEvent::ActiveUsers { users }, receiver)
}

/// Leave transition: unbind, remove presence, notify the remaining room
/// members, and drop the room channel if nobody is left. Shared by the
/// room-switch path and the disconnect path.
pub async fn leave_room(state: &AppState, session: &mut RoomSession) {
    if let Some(page_id) = session.page_id.take() {
        state.presence.leave(page_id, session.user.id).await;
        state
            .rooms
            .publish(
                page_id,
                &session.conn_id,
                ServerEvent::UserLeft {
                    user_id: session.user.id,
                },
            )
            .await;
        state.rooms.prune(page_id).await;
        info!(
            "User {} left page {} (conn {})",
            session.user.id, page_id, session.conn_id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{Collaborator, Page, UserSummary};
    use uuid::Uuid;

    async fn seeded_state() -> (AppState, Page, UserSummary) {
        let state = AppState::new(Config::default());
        let owner = Uuid::new_v4();
        let page = Page::new(owner, "landing");
        state.store.save_page(&page).await.unwrap();
        let user = UserSummary::new(owner, "owner");
        (state, page, user)
    }

    // The socket loop's join sequence without the relay teardown step.
    async fn join_page(
        state: &AppState,
        session: &mut RoomSession,
        page_id: Uuid,
    ) -> Result<(ServerEvent, broadcast::Receiver<BroadcastMessage>), CollabError> {
        let payload = JoinPagePayload { page_id };
        authorize_join(state, session, &payload).await?;
        Ok(join_room(state, session, page_id).await)
    }

    #[tokio::test]
    async fn join_returns_presence_snapshot_and_binds() {
        let (state, page, user) = seeded_state().await;
        let mut session = RoomSession::new(user.clone());

        let (snapshot, _rx) = join_page(&state, &mut session, page.id).await.unwrap();

        assert!(session.is_bound_to(page.id));
        match snapshot {
            ServerEvent::ActiveUsers { users } => {
                assert_eq!(users.len(), 1);
                assert_eq!(users[0].user, user);
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn join_notifies_existing_room_members() {
        let (state, page, user) = seeded_state().await;
        // An already-connected peer.
        let mut peer_rx = state.rooms.subscribe(page.id).await;

        let mut session = RoomSession::new(user.clone());
        join_page(&state, &mut session, page.id).await.unwrap();

        let msg = peer_rx.try_recv().unwrap();
        assert_eq!(msg.sender_id, session.conn_id);
        assert!(matches!(msg.event, ServerEvent::UserJoined { user: u } if u == user));
    }

    #[tokio::test]
    async fn join_missing_page_fails_without_binding() {
        let (state, _page, user) = seeded_state().await;
        let mut session = RoomSession::new(user);

        let err = join_page(&state, &mut session, Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, CollabError::PageNotFound(_)));
        assert!(session.page_id.is_none());
    }

    #[tokio::test]
    async fn stranger_cannot_join() {
        let (state, page, _user) = seeded_state().await;
        let stranger = UserSummary::new(Uuid::new_v4(), "stranger");
        let mut session = RoomSession::new(stranger);

        let err = join_page(&state, &mut session, page.id).await.unwrap_err();
        assert!(matches!(err, CollabError::AccessDenied(Role::Viewer)));
        assert!(state.presence.list_active(page.id).await.is_empty());
    }

    #[tokio::test]
    async fn switching_rooms_leaves_old_room_first() {
        let (state, page_a, user) = seeded_state().await;
        let mut page_b = Page::new(user.id, "about");
        page_b.collaborators.push(Collaborator {
            user_id: user.id,
            role: Role::Viewer,
        });
        state.store.save_page(&page_b).await.unwrap();

        let mut session = RoomSession::new(user.clone());
        join_page(&state, &mut session, page_a.id).await.unwrap();

        let mut a_rx = state.rooms.subscribe(page_a.id).await;
        let mut b_rx = state.rooms.subscribe(page_b.id).await;

        join_page(&state, &mut session, page_b.id).await.unwrap();

        // Departure notice to A, join notice to B.
        assert!(matches!(
            a_rx.try_recv().unwrap().event,
            ServerEvent::UserLeft { user_id } if user_id == user.id
        ));
        assert!(matches!(
            b_rx.try_recv().unwrap().event,
            ServerEvent::UserJoined { .. }
        ));

        // Counted in exactly one presence list.
        assert!(state.presence.list_active(page_a.id).await.is_empty());
        assert_eq!(state.presence.list_active(page_b.id).await.len(), 1);
        assert!(session.is_bound_to(page_b.id));
    }

    #[tokio::test]
    async fn switching_last_member_prunes_old_room() {
        let (state, page_a, user) = seeded_state().await;
        let mut page_b = Page::new(user.id, "about");
        page_b.collaborators.push(Collaborator {
            user_id: user.id,
            role: Role::Viewer,
        });
        state.store.save_page(&page_b).await.unwrap();

        let mut session = RoomSession::new(user.clone());
        let (_, rx_a) = join_page(&state, &mut session, page_a.id).await.unwrap();
        assert_eq!(state.rooms.room_count().await, 1);

        // The socket loop's ordering on a switch: authorize, drop the old
        // room's receiver (forward task teardown), then commit.
        let payload = JoinPagePayload { page_id: page_b.id };
        authorize_join(&state, &session, &payload).await.unwrap();
        drop(rx_a);
        let (_, _rx_b) = join_room(&state, &mut session, page_b.id).await;

        // A was the sole room of its last member: its channel is gone, and
        // nothing published to it reaches the departed connection.
        assert_eq!(state.rooms.room_count().await, 1);
        assert!(state.presence.list_active(page_a.id).await.is_empty());
        assert!(session.is_bound_to(page_b.id));
    }

    #[tokio::test]
    async fn rejoining_same_page_skips_duplicate_notice() {
        let (state, page, user) = seeded_state().await;
        let mut session = RoomSession::new(user.clone());
        join_page(&state, &mut session, page.id).await.unwrap();

        let mut peer_rx = state.rooms.subscribe(page.id).await;
        let (snapshot, _rx) = join_page(&state, &mut session, page.id).await.unwrap();

        // Presence refreshed, snapshot resent, but no user-left/user-joined
        // pair for the peers.
        assert!(peer_rx.try_recv().is_err());
        assert!(session.is_bound_to(page.id));
        match snapshot {
            ServerEvent::ActiveUsers { users } => assert_eq!(users.len(), 1),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_switch_keeps_old_binding() {
        let (state, page_a, user) = seeded_state().await;
        let locked = Page::new(Uuid::new_v4(), "private");
        state.store.save_page(&locked).await.unwrap();

        let mut session = RoomSession::new(user.clone());
        join_page(&state, &mut session, page_a.id).await.unwrap();

        let err = join_page(&state, &mut session, locked.id).await.unwrap_err();
        assert!(matches!(err, CollabError::AccessDenied(_)));
        assert!(session.is_bound_to(page_a.id));
        assert_eq!(state.presence.list_active(page_a.id).await.len(), 1);
    }

    #[tokio::test]
    async fn two_connections_share_presence() {
        let (state, page, owner) = seeded_state().await;
        let mut page_shared = state.store.find_page(page.id).await.unwrap().unwrap();
        let editor = UserSummary::new(Uuid::new_v4(), "editor");
        page_shared.collaborators.push(Collaborator {
            user_id: editor.id,
            role: Role::Editor,
        });
        state.store.save_page(&page_shared).await.unwrap();

        let mut s1 = RoomSession::new(owner.clone());
        let mut s2 = RoomSession::new(editor.clone());
        join_page(&state, &mut s1, page.id).await.unwrap();
        join_page(&state, &mut s2, page.id).await.unwrap();

        let active = state.presence.list_active(page.id).await;
        assert_eq!(active.len(), 2);
        assert!(active.iter().any(|a| a.user == owner));
        assert!(active.iter().any(|a| a.user == editor));
    }

    #[tokio::test]
    async fn last_disconnect_prunes_room() {
        let (state, page, user) = seeded_state().await;
        let mut session = RoomSession::new(user);
        let (_, rx) = join_page(&state, &mut session, page.id).await.unwrap();
        assert_eq!(state.rooms.room_count().await, 1);

        // Disconnect order: the relay's receiver drops before the leave.
        drop(rx);
        leave_room(&state, &mut session).await;

        assert_eq!(state.rooms.room_count().await, 0);
    }

    #[tokio::test]
    async fn leave_notifies_and_cleans_presence() {
        let (state, page, user) = seeded_state().await;
        let mut session = RoomSession::new(user.clone());
        join_page(&state, &mut session, page.id).await.unwrap();
        let mut peer_rx = state.rooms.subscribe(page.id).await;

        leave_room(&state, &mut session).await;

        assert!(session.page_id.is_none());
        assert!(state.presence.list_active(page.id).await.is_empty());
        assert!(matches!(
            peer_rx.try_recv().unwrap().event,
            ServerEvent::UserLeft { user_id } if user_id == user.id
        ));
    }
}
