use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{AdminSummary, PlayerRef, RankingInfo, UserSummary};

/// Messages sent from a client to the coordination server.
///
/// The serialized form is a JSON object tagged with a `type` discriminator.
/// Correlated requests do not carry their `requestId` here; the client's
/// request correlator merges the generated identifier into the serialized
/// object just before transmission.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    AdminJoin {
        administrator_id: String,
    },
    Init {
        administrator_id: String,
        total_round: Option<u32>,
    },
    StartGame {
        administrator_id: String,
    },
    AdminReconnect {
        administrator_id: String,
    },
    UserJoin {
        nickname: String,
    },
    Submit {
        user_id: String,
        score: i64,
        game_type: String,
    },
    UserReconnect {
        user_id: String,
    },
    BroadcastRequest {
        user_id: String,
        payload: String,
    },
    SurvivorJoin {
        user_id: String,
        room_code: String,
        nickname: String,
    },
    SurvivorStart {
        user_id: String,
        room_code: String,
    },
    SurvivorSelect {
        user_id: String,
        room_code: String,
        selected_number: u32,
    },
}

impl ClientMessage {
    /// The wire `type` discriminator for this message.
    pub fn message_type(&self) -> &'static str {
        match self {
            ClientMessage::AdminJoin { .. } => "ADMIN_JOIN",
            ClientMessage::Init { .. } => "INIT",
            ClientMessage::StartGame { .. } => "START_GAME",
            ClientMessage::AdminReconnect { .. } => "ADMIN_RECONNECT",
            ClientMessage::UserJoin { .. } => "USER_JOIN",
            ClientMessage::Submit { .. } => "SUBMIT",
            ClientMessage::UserReconnect { .. } => "USER_RECONNECT",
            ClientMessage::BroadcastRequest { .. } => "BROADCAST_REQUEST",
            ClientMessage::SurvivorJoin { .. } => "SURVIVOR_JOIN",
            ClientMessage::SurvivorStart { .. } => "SURVIVOR_START",
            ClientMessage::SurvivorSelect { .. } => "SURVIVOR_SELECT",
        }
    }
}

/// Messages asserted by the coordination server.
///
/// `requestId` echoes are optional everywhere: the server includes them on
/// responses to correlated requests, but clients never rely on their
/// presence for dispatch.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    AdminJoined {
        #[serde(default)]
        request_id: Option<String>,
    },
    AdminReconnected {
        #[serde(default)]
        request_id: Option<String>,
    },
    UserJoined {
        user_id: String,
        nickname: String,
        #[serde(default)]
        request_id: Option<String>,
    },
    UserJoinedAdmin {
        user_id: String,
        user_count: u32,
        nickname: String,
        #[serde(default)]
        request_id: Option<String>,
    },
    UserReconnected {
        user_id: String,
        #[serde(default)]
        request_id: Option<String>,
    },
    NextGame {
        game_type: String,
        current_round: u32,
    },
    Wait {
        game_type: String,
        start_at: i64,
        duration: i64,
        current_ms: i64,
    },
    EnterGame,
    AggregatedAdmin(Box<AdminSummary>),
    AggregatedUser(Box<UserSummary>),
    End {
        overall_ranking: Vec<RankingInfo>,
    },
    Broadcast {
        user_id: String,
        payload: String,
        #[serde(default)]
        request_id: Option<String>,
    },
    Error {
        message: String,
    },
    RoundStart {
        round: u32,
        time_limit: u32,
        max_number: u32,
        #[serde(default)]
        reset_elimination_status: Option<bool>,
        #[serde(default)]
        player_statuses: Option<HashMap<String, bool>>,
        #[serde(default)]
        all_players_revived: Option<bool>,
    },
    RoundResult {
        round: u32,
        number_selections: HashMap<String, Vec<PlayerRef>>,
        survivors: Vec<PlayerRef>,
        eliminated: Vec<PlayerRef>,
    },
    GameOver {
        winners: Vec<PlayerRef>,
        #[serde(default)]
        close_connection: Option<bool>,
    },
    Waiting {
        message: String,
        current_players: u32,
    },
    WaitingCountdown {
        message: String,
        time_left: u32,
        current_players: u32,
    },
    PrepareStart {
        message: String,
        time_left: u32,
        current_players: u32,
    },
    PrepareCountdown {
        message: String,
        time_left: u32,
        current_players: u32,
    },
    GamePreparing {
        message: String,
        current_players: u32,
    },
    GameInProgress {
        message: String,
    },
}

impl ServerMessage {
    /// The wire `type` discriminator for this message.
    pub fn message_type(&self) -> &'static str {
        match self {
            ServerMessage::AdminJoined { .. } => "ADMIN_JOINED",
            ServerMessage::AdminReconnected { .. } => "ADMIN_RECONNECTED",
            ServerMessage::UserJoined { .. } => "USER_JOINED",
            ServerMessage::UserJoinedAdmin { .. } => "USER_JOINED_ADMIN",
            ServerMessage::UserReconnected { .. } => "USER_RECONNECTED",
            ServerMessage::NextGame { .. } => "NEXT_GAME",
            ServerMessage::Wait { .. } => "WAIT",
            ServerMessage::EnterGame => "ENTER_GAME",
            ServerMessage::AggregatedAdmin(_) => "AGGREGATED_ADMIN",
            ServerMessage::AggregatedUser(_) => "AGGREGATED_USER",
            ServerMessage::End { .. } => "END",
            ServerMessage::Broadcast { .. } => "BROADCAST",
            ServerMessage::Error { .. } => "ERROR",
            ServerMessage::RoundStart { .. } => "ROUND_START",
            ServerMessage::RoundResult { .. } => "ROUND_RESULT",
            ServerMessage::GameOver { .. } => "GAME_OVER",
            ServerMessage::Waiting { .. } => "WAITING",
            ServerMessage::WaitingCountdown { .. } => "WAITING_COUNTDOWN",
            ServerMessage::PrepareStart { .. } => "PREPARE_START",
            ServerMessage::PrepareCountdown { .. } => "PREPARE_COUNTDOWN",
            ServerMessage::GamePreparing { .. } => "GAME_PREPARING",
            ServerMessage::GameInProgress { .. } => "GAME_IN_PROGRESS",
        }
    }
}
