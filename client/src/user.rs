use std::sync::Arc;

use tracing::error;

use partyhub_common::protocol::ClientMessage;

use crate::dispatcher::{Event, EventKey, HandlerId};
use crate::manager::SocketManager;
use crate::store::UserStore;

/// Participant client.
///
/// Wraps a [`SocketManager`] with the typed request builders a player's
/// browser tab uses during a session. Identity values come from the
/// collaborator-owned [`UserStore`]; a missing value logs an error and
/// sends nothing.
pub struct UserClient {
    manager: SocketManager,
    store: Arc<UserStore>,
}

impl UserClient {
    pub fn new(store: Arc<UserStore>) -> Self {
        Self::with_manager(SocketManager::new(), store)
    }

    pub fn with_manager(manager: SocketManager, store: Arc<UserStore>) -> Self {
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

    /// Join the room under the nickname stored for this participant.
    pub fn join(&self) -> bool {
        let Some(nickname) = self.store.nickname() else {
            error!("nickname is not set");
            return false;
        };
        self.manager.send_request(&ClientMessage::UserJoin { nickname })
    }

    /// Submit this participant's score for the round just played.
    pub fn submit(&self, score: i64, game_type: impl Into<String>) -> bool {
        let Some(user_id) = self.store.user_id() else {
            error!("user id is not set");
            return false;
        };
        self.manager.send_request(&ClientMessage::Submit {
            user_id,
            score,
            game_type: game_type.into(),
        })
    }

    /// Re-attach to a running session after a dropped connection.
    pub fn reconnect(&self) -> bool {
        let Some(user_id) = self.store.user_id() else {
            error!("user id is not set");
            return false;
        };
        self.manager
            .send_request(&ClientMessage::UserReconnect { user_id })
    }

    /// Ask the server to relay a payload to every participant in the room.
    pub fn broadcast(&self, payload: impl Into<String>) -> bool {
        let Some(user_id) = self.store.user_id() else {
            error!("user id is not set");
            return false;
        };
        self.manager.send_request(&ClientMessage::BroadcastRequest {
            user_id,
            payload: payload.into(),
        })
    }
}
