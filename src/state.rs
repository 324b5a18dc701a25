use crate::config::Config;
use crate::store::PageStore;
use crate::ws::presence::PresenceRegistry;
use crate::ws::rooms::RoomRegistry;
use crate::ws::userctx::UserCtxCache;

/// Process-wide services, constructed once in `main` and injected into the
/// HTTP and WebSocket handlers.
pub struct AppState {
    pub config: Config,
    pub store: PageStore,
    pub rooms: RoomRegistry,
    pub presence: PresenceRegistry,
    pub user_ctx: UserCtxCache,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let capacity = config.broadcast_capacity;
        Self {
            config,
            store: PageStore::new(),
            rooms: RoomRegistry::new(capacity),
            presence: PresenceRegistry::new(),
            user_ctx: UserCtxCache::new(),
        }
    }
}
