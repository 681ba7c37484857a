use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::dao::models::{Choice, RoundPhase, RoundStatus};
use crate::dto::room::RoomStatusResponse;

/// Query parameters of the polling endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct StateQuery {
    /// Version the client already holds; 0 (or absent) forces a full snapshot.
    pub version: Option<i64>,
    /// Optional player identifier for a personalized snapshot.
    pub player_id: Option<Uuid>,
}

/// One room member as listed in the snapshot.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerStatePayload {
    pub player_id: Uuid,
    pub display_name: String,
    pub is_host: bool,
}

/// Per-player submission progress for the current round.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerSubmissionStatus {
    pub player_id: Uuid,
    pub display_name: String,
    pub submitted: bool,
}

/// Current round as seen in the snapshot, personalized when `player_id` was
/// supplied. The opponent-facing fields only appear once the round has been
/// published.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoundStatePayload {
    pub round_number: i32,
    pub phase: RoundPhase,
    pub status: RoundStatus,
    /// Whether the host force-completed the round.
    pub skipped: bool,
    /// Distinct players that have submitted an action.
    pub submitted_actions: i64,
    /// Players expected to submit this round.
    pub total_players: i64,
    pub player_submissions: Vec<PlayerSubmissionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub your_choice: Option<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_choice: Option<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub your_payoff: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_payoff: Option<i32>,
}

/// Opponent message delivered through the snapshot during message rounds.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageStatePayload {
    pub round_number: i32,
    pub content: String,
    pub from_player_id: Uuid,
    pub from_display_name: String,
}

/// Full snapshot payload returned when the client is behind.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomStatePayload {
    pub room: RoomStatusResponse,
    pub players: Vec<PlayerStatePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<RoundStatePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageStatePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator_symbol: Option<String>,
    pub indicators_assigned: bool,
}

/// Envelope of the polling endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomStateResponse {
    /// Version of the snapshot (or of the state the client already holds).
    pub version: i64,
    pub has_update: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<RoomStatePayload>,
}

impl RoomStateResponse {
    /// Response for a client that is already up to date.
    pub fn unchanged(version: i64) -> Self {
        Self {
            version,
            has_update: false,
            data: None,
        }
    }
}
