use std::sync::Arc;

use tracing::error;

use partyhub_common::protocol::ClientMessage;

use crate::dispatcher::{Event, EventKey, HandlerId};
use crate::manager::SocketManager;
use crate::store::AdminStore;

/// Administrator session-control client.
///
/// Wraps a [`SocketManager`] with the typed request builders the host
/// screen uses to drive a game session. Every builder reads the
/// administrator identity from the collaborator-owned [`AdminStore`]; when
/// it is absent the operation logs an error and sends nothing.
pub struct AdminClient {
    manager: SocketManager,
    store: Arc<AdminStore>,
}

impl AdminClient {
    pub fn new(store: Arc<AdminStore>) -> Self {
        Self::with_manager(SocketManager::new(), store)
    }

    pub fn with_manager(manager: SocketManager, store: Arc<AdminStore>) -> Self {
        Self { manager, store }
    }

    pub fn manager(&self) -> &SocketManager {
        &self.manager
    }

    pub fn set_server_url(&self, url: impl Into<String>) {
        self.manager.set_server_url(url);
    }

    pub fn connect(&self) {
        self.manager.connect();
    }

    pub fn disconnect(&self) {
        self.manager.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    pub fn on(
        &self,
        key: EventKey,
        handler: impl Fn(&Event) + Send + Sync + 'static,
    ) -> HandlerId {
        self.manager.on(key, handler)
    }

    pub fn off(&self, key: &EventKey, id: Option<HandlerId>) {
        self.manager.off(key, id);
    }

    /// Announce the administrator to the coordination server.
    pub fn join(&self) -> bool {
        self.correlated(|administrator_id| ClientMessage::AdminJoin { administrator_id })
    }

    /// Initialize a session with the given number of rounds.
    pub fn init_session(&self, total_round: Option<u32>) -> bool {
        self.correlated(|administrator_id| ClientMessage::Init {
            administrator_id,
            total_round,
        })
    }

    /// Start the next game for everyone in the room.
    pub fn start_game(&self) -> bool {
        self.correlated(|administrator_id| ClientMessage::StartGame { administrator_id })
    }

    /// Re-attach to a running session after a dropped connection.
    pub fn reconnect(&self) -> bool {
        self.correlated(|administrator_id| ClientMessage::AdminReconnect { administrator_id })
    }

    fn correlated(&self, build: impl FnOnce(String) -> ClientMessage) -> bool {
        let Some(administrator_id) = self.store.administrator_id() else {
            error!("administrator id is not set");
            return false;
        };
        self.manager.send_request(&build(administrator_id))
    }
}
