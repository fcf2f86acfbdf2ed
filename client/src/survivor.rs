use std::time::Duration;

use tracing::debug;

use partyhub_common::protocol::{ClientMessage, ServerMessage};

use crate::codec::InboundMessage;
use crate::dispatcher::{Event, EventKey, HandlerId};
use crate::manager::SocketManager;

/// Grace period before tearing the connection down after a final
/// `GAME_OVER`, so late round events still reach their handlers.
const CLOSE_AFTER_GAME_OVER: Duration = Duration::from_millis(500);

/// Connection for the number-survival minigame.
///
/// Minigames run against their own endpoint rather than the shared
/// admin/user sockets: each `SurvivorClient` owns an independent manager
/// with its own connection and pending-request set, so its state never
/// reflects (or disturbs) the session-wide connections.
///
/// All sends are fire-and-forget; round flow is observed through the
/// `ROUND_START` / `ROUND_RESULT` / `GAME_OVER` events.
pub struct SurvivorClient {
    manager: SocketManager,
}

impl SurvivorClient {
    /// Client targeting `endpoint`, e.g. `ws://host/ws/game/survivor`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_manager(SocketManager::new(), endpoint)
    }

    pub fn with_manager(manager: SocketManager, endpoint: impl Into<String>) -> Self {
        manager.set_server_url(endpoint);

        // The server flags its last GAME_OVER with closeConnection; honor it
        // shortly after so the final result still renders.
        let weak = manager.downgrade();
        manager.on(EventKey::message_type("GAME_OVER"), move |event| {
            if let Event::Message(InboundMessage::Known(ServerMessage::GameOver {
                close_connection: Some(true),
                ..
            })) = event
                && let Some(manager) = weak.upgrade()
            {
                debug!("server requested connection close after game over");
                manager.disconnect_later(CLOSE_AFTER_GAME_OVER);
            }
        });

        Self { manager }
    }

    pub fn manager(&self) -> &SocketManager {
        &self.manager
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

    /// Enter the minigame lobby for the given room.
    pub fn join(&self, user_id: &str, room_code: &str, nickname: &str) -> bool {
        self.manager.send(&ClientMessage::SurvivorJoin {
            user_id: user_id.to_owned(),
            room_code: room_code.to_owned(),
            nickname: nickname.to_owned(),
        })
    }

    /// Request the round loop to begin.
    pub fn start(&self, user_id: &str, room_code: &str) -> bool {
        self.manager.send(&ClientMessage::SurvivorStart {
            user_id: user_id.to_owned(),
            room_code: room_code.to_owned(),
        })
    }

    /// Pick a number for the current round.
    pub fn select(&self, user_id: &str, room_code: &str, number: u32) -> bool {
        self.manager.send(&ClientMessage::SurvivorSelect {
            user_id: user_id.to_owned(),
            room_code: room_code.to_owned(),
            selected_number: number,
        })
    }
}
