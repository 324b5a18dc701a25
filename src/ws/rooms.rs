use std::collections::HashMap;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::models::{BroadcastMessage, ServerEvent};

/// Per-page broadcast fan-out.
///
/// Each page with at least one connected editor owns a broadcast channel.
/// Publishing tags the message with the sender's connection id; the
/// per-connection forward task filters that id out, which is what implements
/// "room minus sender".
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<Uuid, broadcast::Sender<BroadcastMessage>>>,
    capacity: usize,
}

impl RoomRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Subscribe a connection to a page room, creating the channel if this
    /// is the first subscriber.
    pub async fn subscribe(&self, page_id: Uuid) -> broadcast::Receiver<BroadcastMessage> {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(page_id)
            .or_insert_with(|| {
                debug!("Opening room for page {}", page_id);
                broadcast::channel(self.capacity).0
            })
            .subscribe()
    }

    /// Publish an event to a room on behalf of `sender_id`. A room with no
    /// subscribers is a no-op.
    pub async fn publish(&self, page_id: Uuid, sender_id: &str, event: ServerEvent) {
        let rooms = self.rooms.read().await;
        if let Some(tx) = rooms.get(&page_id) {
            // send only errors when there are no receivers left.
            let _ = tx.send(BroadcastMessage {
                sender_id: sender_id.to_string(),
                event,
            });
        }
    }

    /// Drop the channel for a page once its last subscriber is gone.
    pub async fn prune(&self, page_id: Uuid) {
        let mut rooms = self.rooms.write().await;
        if let Some(tx) = rooms.get(&page_id) {
            if tx.receiver_count() == 0 {
                debug!("Closing room for page {}", page_id);
                rooms.remove(&page_id);
            }
        }
    }

    /// Rooms with at least one subscriber, for diagnostics.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}
