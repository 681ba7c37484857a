use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::common::OkResponse,
    dto::room::{
        GameSummaryResponse, RoomCreatedResponse, RoomDeletedResponse, RoomListQuery,
        RoomListResponse, RoomStatusResponse, RoundStartedResponse,
    },
    dto::state::{RoomStateResponse, StateQuery},
    error::AppError,
    services::{room_service, state_service},
    state::SharedState,
};

/// Routes handling room lifecycle and the polling snapshot.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms", post(create_room).get(list_rooms))
        .route("/rooms/{room}", get(get_room_status).delete(delete_room))
        .route("/rooms/{room}/state", get(get_room_state))
        .route("/rooms/{room}/start", post(start_game))
        .route("/rooms/{room}/rounds/next", post(next_round))
        .route("/rooms/{room}/end", post(end_game))
        .route("/rooms/{room}/summary", get(get_game_summary))
}

/// Create a room together with its host player.
#[utoipa::path(
    post,
    path = "/api/rooms",
    tag = "rooms",
    responses((status = 200, description = "Room created", body = RoomCreatedResponse))
)]
pub async fn create_room(
    State(state): State<SharedState>,
) -> Result<Json<RoomCreatedResponse>, AppError> {
    let created = room_service::create_room(&state).await?;
    Ok(Json(created))
}

/// List rooms for the admin view, most recently active first.
#[utoipa::path(
    get,
    path = "/api/rooms",
    tag = "rooms",
    params(RoomListQuery),
    responses((status = 200, description = "Paged room listing", body = RoomListResponse))
)]
pub async fn list_rooms(
    State(state): State<SharedState>,
    Query(query): Query<RoomListQuery>,
) -> Result<Json<RoomListResponse>, AppError> {
    let listing = room_service::list_rooms(&state, query).await?;
    Ok(Json(listing))
}

/// Look up a room's public status by its 6-character join code.
#[utoipa::path(
    get,
    path = "/api/rooms/{code}",
    tag = "rooms",
    params(("code" = String, Path, description = "6-character room code")),
    responses(
        (status = 200, description = "Room status", body = RoomStatusResponse),
        (status = 404, description = "Room not found")
    )
)]
pub async fn get_room_status(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<RoomStatusResponse>, AppError> {
    let status = room_service::get_room_by_code(&state, &code).await?;
    Ok(Json(status))
}

/// Delete a room and everything it contains.
#[utoipa::path(
    delete,
    path = "/api/rooms/{room_id}",
    tag = "rooms",
    params(("room_id" = Uuid, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Room deleted", body = RoomDeletedResponse),
        (status = 404, description = "Room not found")
    )
)]
pub async fn delete_room(
    State(state): State<SharedState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<RoomDeletedResponse>, AppError> {
    room_service::delete_room(&state, room_id).await?;
    Ok(Json(RoomDeletedResponse {
        status: "deleted".to_string(),
        room_id,
    }))
}

/// Versioned snapshot used by short-polling clients.
#[utoipa::path(
    get,
    path = "/api/rooms/{room_id}/state",
    tag = "rooms",
    params(
        ("room_id" = Uuid, Path, description = "Room identifier"),
        StateQuery,
    ),
    responses(
        (status = 200, description = "Snapshot or no-update marker", body = RoomStateResponse),
        (status = 404, description = "Room not found")
    )
)]
pub async fn get_room_state(
    State(state): State<SharedState>,
    Path(room_id): Path<Uuid>,
    Query(query): Query<StateQuery>,
) -> Result<Json<RoomStateResponse>, AppError> {
    let snapshot = state_service::build_room_state(
        &state,
        room_id,
        query.version.unwrap_or(0),
        query.player_id,
    )
    .await?;
    Ok(Json(snapshot))
}

/// Start the game and create round 1 (host endpoint).
#[utoipa::path(
    post,
    path = "/api/rooms/{room_id}/start",
    tag = "rooms",
    params(("room_id" = Uuid, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Game started", body = OkResponse),
        (status = 400, description = "Wrong status or player count"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<OkResponse>, AppError> {
    room_service::start_game(&state, room_id).await?;
    Ok(Json(OkResponse::ok()))
}

/// Advance to the next round (host endpoint).
#[utoipa::path(
    post,
    path = "/api/rooms/{room_id}/rounds/next",
    tag = "rooms",
    params(("room_id" = Uuid, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Round created", body = RoundStartedResponse),
        (status = 400, description = "Current round not completed or rounds exhausted"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn next_round(
    State(state): State<SharedState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<RoundStartedResponse>, AppError> {
    let round_number = room_service::next_round(&state, room_id).await?;
    Ok(Json(RoundStartedResponse {
        status: "ok".to_string(),
        round_number,
    }))
}

/// End the game (host endpoint).
#[utoipa::path(
    post,
    path = "/api/rooms/{room_id}/end",
    tag = "rooms",
    params(("room_id" = Uuid, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Game ended", body = OkResponse),
        (status = 400, description = "Room is not playing"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn end_game(
    State(state): State<SharedState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<OkResponse>, AppError> {
    room_service::end_game(&state, room_id).await?;
    Ok(Json(OkResponse::ok()))
}

/// Final ranking and strategy statistics for a room.
#[utoipa::path(
    get,
    path = "/api/rooms/{room_id}/summary",
    tag = "rooms",
    params(("room_id" = Uuid, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Game summary", body = GameSummaryResponse),
        (status = 404, description = "Room not found")
    )
)]
pub async fn get_game_summary(
    State(state): State<SharedState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<GameSummaryResponse>, AppError> {
    let summary = room_service::game_summary(&state, room_id).await?;
    Ok(Json(summary))
}
