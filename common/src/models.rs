use serde::{Deserialize, Serialize};

/// A single entry in a round or overall ranking table.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankingInfo {
    pub rank: u32,
    pub user_id: String,
    pub nickname: String,
    pub score: i64,
}

/// Reference to a participant, as embedded in round results.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRef {
    pub user_id: String,
    pub nickname: String,
}

/// Gameplay highlight attached to aggregated results (best/worst play).
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HighlightInfo {
    pub user_id: String,
    pub nickname: String,
    pub video_url: String,
}

/// Aggregated round results as delivered to the administrator screen.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    #[serde(default)]
    pub request_id: Option<String>,
    pub current_round: u32,
    pub total_round: u32,
    pub game_type: String,
    pub round_player_count: u32,
    pub total_player_count: u32,
    pub round_ranking: Vec<RankingInfo>,
    pub overall_ranking: Vec<RankingInfo>,
    pub first_place: HighlightInfo,
    pub last_place: HighlightInfo,
}

/// Aggregated round results as delivered to one participant.
///
/// `rank_record` is a `|`-separated history of the participant's rank per
/// round; `video_upload_url` is a presigned URL the participant may use to
/// upload their highlight clip.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(default)]
    pub request_id: Option<String>,
    pub current_round: u32,
    pub total_round: u32,
    pub game_type: String,
    pub current_score: i64,
    pub total_score: i64,
    pub rank_record: String,
    pub round_rank: u32,
    pub overall_rank: u32,
    pub round_player_count: u32,
    pub total_player_count: u32,
    pub round_ranking: Vec<RankingInfo>,
    pub overall_ranking: Vec<RankingInfo>,
    pub video_upload_url: String,
}
