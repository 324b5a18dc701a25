use uuid::Uuid;

use crate::models::UserSummary;

/// Per-connection room binding.
///
/// A connection is bound to at most one page at a time; `page_id` is the
/// state machine: `None` is unbound, `Some` is bound. Transitions happen
/// only in the join and disconnect paths of the protocol handler.
#[derive(Debug, Clone)]
pub struct RoomSession {
    /// Connection id, used as the broadcast sender filter.
    pub conn_id: String,
    /// The authenticated user behind this connection.
    pub user: UserSummary,
    /// Currently bound page, if any.
    pub page_id: Option<Uuid>,
}

impl RoomSession {
    pub fn new(user: UserSummary) -> Self {
        Self {
            conn_id: Uuid::new_v4().to_string(),
            user,
            page_id: None,
        }
    }

    pub fn is_bound_to(&self, page_id: Uuid) -> bool {
        self.page_id == Some(page_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unbound_with_unique_conn_id() {
        let user = UserSummary::new(Uuid::new_v4(), "ada");
        let a = RoomSession::new(user.clone());
        let b = RoomSession::new(user);
        assert!(a.page_id.is_none());
        assert_ne!(a.conn_id, b.conn_id);
    }
}
