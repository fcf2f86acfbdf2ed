//! PartyHub Client Library
//!
//! This library provides the real-time connection layer for the PartyHub
//! party-game platform: a reconnecting WebSocket message channel with typed
//! publish/subscribe dispatch, bounded automatic reconnection, and
//! correlated request tracking, plus role-specialized clients for the
//! administrator screen, the participants, and per-minigame connections.
//!
//! ## Usage
//!
//! ### Role Clients (Recommended)
//!
//! The role clients wrap the base manager with the typed operations a
//! screen actually performs:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use partyhub_client::{AdminClient, AdminStore, Event, EventKey, PlatformClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let platform = PlatformClient::new("http://localhost:8080")?;
//!     let room_code = platform.create_room().await?;
//!     println!("room code: {room_code}");
//!
//!     let store = Arc::new(AdminStore::new());
//!     store.set_administrator_id("admin-1");
//!
//!     let admin = AdminClient::new(store);
//!     admin.on(EventKey::Connect, |_event| println!("connected"));
//!     admin.on(EventKey::message_type("USER_JOINED_ADMIN"), |event| {
//!         if let Event::Message(message) = event {
//!             println!("a player joined: {:?}", message);
//!         }
//!     });
//!
//!     admin.set_server_url(platform.admin_socket_url()?);
//!     admin.connect();
//!
//!     // Once connected:
//!     admin.join();
//!     admin.init_session(Some(5));
//!     Ok(())
//! }
//! ```
//!
//! ### Base Manager
//!
//! For full control, use the `SocketManager` directly:
//!
//! ```rust,no_run
//! use partyhub_client::{ClientMessage, Event, EventKey, SocketManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let manager = SocketManager::new();
//!     manager.set_server_url("ws://localhost:8080/ws/game/user/ROOM42");
//!
//!     manager.on(EventKey::message_type("ROUND_START"), |event| {
//!         if let Event::Message(message) = event {
//!             println!("round started: {:?}", message);
//!         }
//!     });
//!     manager.on(EventKey::Disconnect, |_event| println!("disconnected"));
//!
//!     manager.connect();
//!
//!     // Sends return `false` instead of failing loudly while disconnected.
//!     let sent = manager.send_request(&ClientMessage::UserJoin {
//!         nickname: "Ada".into(),
//!     });
//!     println!("join queued: {sent}");
//! }
//! ```

mod admin;
mod api;
mod codec;
mod dispatcher;
mod error;
mod manager;
mod scheduler;
mod store;
mod survivor;
mod transport;
mod user;

pub use admin::AdminClient;
pub use api::PlatformClient;
pub use codec::{InboundMessage, decode_frame};
pub use dispatcher::{Disconnection, Event, EventDispatcher, EventKey, HandlerId};
pub use error::{ClientError, DecodeError};
pub use manager::{ClientConfig, ReadyState, SocketManager, WeakSocketManager};
pub use scheduler::{ManualScheduler, Scheduler, TimerGuard, TimerTask, TokioScheduler};
pub use store::{AdminStore, UserStore};
pub use survivor::SurvivorClient;
pub use transport::{CloseFrame, Connection, Connector, Frame, WsConnector};
pub use user::UserClient;

// Re-export protocol types for convenience
pub use partyhub_common::{models::*, protocol::*};

pub type Result<T> = std::result::Result<T, ClientError>;
