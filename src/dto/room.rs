use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::{RoomRecord, RoomStatus};
use crate::dto::format_timestamp;

/// Body returned after creating a room.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomCreatedResponse {
    /// Identifier of the new room.
    pub room_id: Uuid,
    /// 6-character code students type to join.
    pub code: String,
    /// Identifier of the auto-created host player.
    pub host_player_id: Uuid,
}

/// Public status of a room, as shown on the join screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomStatusResponse {
    pub room_id: Uuid,
    pub code: String,
    pub status: RoomStatus,
    pub current_round: i32,
    /// Number of players excluding the host.
    pub player_count: i64,
}

impl RoomStatusResponse {
    pub fn from_record(room: &RoomRecord, player_count: i64) -> Self {
        Self {
            room_id: room.id,
            code: room.code.clone(),
            status: room.status,
            current_round: room.current_round,
            player_count,
        }
    }
}

/// Query parameters of the room listing endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct RoomListQuery {
    /// Optional status filter (WAITING/PLAYING/FINISHED).
    pub status: Option<String>,
    /// Page size, 1-200 (default 50).
    pub limit: Option<i64>,
    /// Pagination offset (default 0).
    pub offset: Option<i64>,
}

/// One row of the room listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomListItem {
    pub room_id: Uuid,
    pub code: String,
    pub status: RoomStatus,
    pub current_round: i32,
    pub player_count: i64,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 last-activity timestamp.
    pub updated_at: String,
}

impl RoomListItem {
    pub fn from_record(room: &RoomRecord, player_count: i64) -> Self {
        Self {
            room_id: room.id,
            code: room.code.clone(),
            status: room.status,
            current_round: room.current_round,
            player_count,
            created_at: format_timestamp(room.created_at),
            updated_at: format_timestamp(room.updated_at),
        }
    }
}

/// Paged listing of rooms, most recently active first.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomListResponse {
    pub rooms: Vec<RoomListItem>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Body returned after deleting a room.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomDeletedResponse {
    /// Always "deleted".
    pub status: String,
    pub room_id: Uuid,
}

/// Body of the join request.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinRoomRequest {
    /// Nickname shown to other players, 1-50 characters.
    #[validate(length(min = 1, max = 50, message = "nickname must be 1-50 characters"))]
    pub nickname: String,
}

/// Body returned after a successful join.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerJoinedResponse {
    pub player_id: Uuid,
    pub room_id: Uuid,
    pub display_name: String,
}

/// Body returned after advancing to the next round.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoundStartedResponse {
    /// Always "ok".
    pub status: String,
    /// Number of the round the room is now in.
    pub round_number: i32,
}

/// One player's final standing in the end-of-game summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerSummary {
    pub display_name: String,
    pub total_payoff: i64,
}

/// Room-wide strategy statistics for the end-of-game summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameStats {
    /// Share of ACCELERATE among all submitted actions, rounded to 2 decimals.
    pub accelerate_ratio: f64,
    /// Share of TURN among all submitted actions, rounded to 2 decimals.
    pub turn_ratio: f64,
}

/// End-of-game summary: ranking plus strategy statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSummaryResponse {
    /// Players ordered by total payoff, highest first.
    pub players: Vec<PlayerSummary>,
    pub stats: GameStats,
}
