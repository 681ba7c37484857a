use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::{Choice, RoundPhase, RoundStatus};

/// Query parameter carrying the acting player's identifier.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PlayerIdQuery {
    pub player_id: Uuid,
}

/// Current round of the room as shown on the projector.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoundCurrentResponse {
    pub round_number: i32,
    pub phase: RoundPhase,
    pub status: RoundStatus,
}

/// A player's opponent for one round.
#[derive(Debug, Serialize, ToSchema)]
pub struct PairResponse {
    pub opponent_id: Uuid,
    pub opponent_display_name: String,
}

/// Body of the action submission request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitActionRequest {
    pub player_id: Uuid,
    pub choice: Choice,
}

/// Published outcome of one round from the asking player's perspective.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoundResultResponse {
    pub opponent_display_name: String,
    pub your_choice: Choice,
    pub opponent_choice: Choice,
    pub your_payoff: i32,
    pub opponent_payoff: i32,
}

/// Body of the message submission request (rounds 5-6).
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SendMessageRequest {
    pub sender_id: Uuid,
    /// Message shown to the opponent, 1-100 characters.
    #[validate(length(min = 1, max = 100, message = "message must be 1-100 characters"))]
    pub content: String,
}

/// A message received from the paired opponent.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub content: String,
    /// Always true; senders are never revealed by name.
    pub from_opponent: bool,
}

/// The emoji identity symbol assigned to the asking player.
#[derive(Debug, Serialize, ToSchema)]
pub struct IndicatorResponse {
    pub symbol: String,
}
