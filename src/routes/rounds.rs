use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::common::OkResponse,
    dto::round::{
        IndicatorResponse, MessageResponse, PairResponse, PlayerIdQuery, RoundCurrentResponse,
        RoundResultResponse, SendMessageRequest, SubmitActionRequest,
    },
    error::AppError,
    services::{indicator_service, message_service, round_service},
    state::SharedState,
};

/// Routes handling round play: actions, publication, results, messages and
/// indicators.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms/{room}/rounds/current", get(get_current_round))
        .route("/rooms/{room}/rounds/{round_number}/pair", get(get_pair))
        .route("/rooms/{room}/rounds/{round_number}/action", post(submit_action))
        .route("/rooms/{room}/rounds/{round_number}/publish", post(publish_round))
        .route("/rooms/{room}/rounds/{round_number}/skip", post(skip_round))
        .route("/rooms/{room}/rounds/{round_number}/result", get(get_round_result))
        .route(
            "/rooms/{room}/rounds/{round_number}/message",
            post(send_message).get(get_message),
        )
        .route("/rooms/{room}/indicators/assign", post(assign_indicators))
        .route("/rooms/{room}/indicator", get(get_indicator))
}

/// Current round of the room.
#[utoipa::path(
    get,
    path = "/api/rooms/{room_id}/rounds/current",
    tag = "rounds",
    params(("room_id" = Uuid, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Current round", body = RoundCurrentResponse),
        (status = 404, description = "No active round")
    )
)]
pub async fn get_current_round(
    State(state): State<SharedState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<RoundCurrentResponse>, AppError> {
    let current = round_service::get_current_round(&state, room_id).await?;
    Ok(Json(current))
}

/// The asking player's opponent for one round.
#[utoipa::path(
    get,
    path = "/api/rooms/{room_id}/rounds/{round_number}/pair",
    tag = "rounds",
    params(
        ("room_id" = Uuid, Path, description = "Room identifier"),
        ("round_number" = i32, Path, description = "Round number (1-10)"),
        PlayerIdQuery,
    ),
    responses(
        (status = 200, description = "Opponent info", body = PairResponse),
        (status = 404, description = "Round or pair not found")
    )
)]
pub async fn get_pair(
    State(state): State<SharedState>,
    Path((room_id, round_number)): Path<(Uuid, i32)>,
    Query(query): Query<PlayerIdQuery>,
) -> Result<Json<PairResponse>, AppError> {
    let pair = round_service::get_pair(&state, room_id, round_number, query.player_id).await?;
    Ok(Json(pair))
}

/// Submit a choice for a round (idempotent).
#[utoipa::path(
    post,
    path = "/api/rooms/{room_id}/rounds/{round_number}/action",
    tag = "rounds",
    params(
        ("room_id" = Uuid, Path, description = "Room identifier"),
        ("round_number" = i32, Path, description = "Round number (1-10)"),
    ),
    request_body = SubmitActionRequest,
    responses(
        (status = 200, description = "Action recorded", body = OkResponse),
        (status = 400, description = "Wrong status or non-participant"),
        (status = 404, description = "Room, round or player not found")
    )
)]
pub async fn submit_action(
    State(state): State<SharedState>,
    Path((room_id, round_number)): Path<(Uuid, i32)>,
    Json(payload): Json<SubmitActionRequest>,
) -> Result<Json<OkResponse>, AppError> {
    round_service::submit_action(&state, room_id, round_number, payload.player_id, payload.choice)
        .await?;
    Ok(Json(OkResponse::ok()))
}

/// Publish a finalized round (host endpoint, idempotent).
#[utoipa::path(
    post,
    path = "/api/rooms/{room_id}/rounds/{round_number}/publish",
    tag = "rounds",
    params(
        ("room_id" = Uuid, Path, description = "Room identifier"),
        ("round_number" = i32, Path, description = "Round number (1-10)"),
    ),
    responses(
        (status = 200, description = "Round published", body = OkResponse),
        (status = 400, description = "Round not ready to publish"),
        (status = 404, description = "Round not found")
    )
)]
pub async fn publish_round(
    State(state): State<SharedState>,
    Path((room_id, round_number)): Path<(Uuid, i32)>,
) -> Result<Json<OkResponse>, AppError> {
    round_service::publish_round(&state, room_id, round_number).await?;
    Ok(Json(OkResponse::ok()))
}

/// Force-complete a round, filling TURN for absent players (host endpoint).
#[utoipa::path(
    post,
    path = "/api/rooms/{room_id}/rounds/{round_number}/skip",
    tag = "rounds",
    params(
        ("room_id" = Uuid, Path, description = "Room identifier"),
        ("round_number" = i32, Path, description = "Round number (1-10)"),
    ),
    responses(
        (status = 200, description = "Round skipped", body = OkResponse),
        (status = 400, description = "Round already completed"),
        (status = 404, description = "Round not found")
    )
)]
pub async fn skip_round(
    State(state): State<SharedState>,
    Path((room_id, round_number)): Path<(Uuid, i32)>,
) -> Result<Json<OkResponse>, AppError> {
    round_service::skip_round(&state, room_id, round_number).await?;
    Ok(Json(OkResponse::ok()))
}

/// Published outcome of a round for one player.
#[utoipa::path(
    get,
    path = "/api/rooms/{room_id}/rounds/{round_number}/result",
    tag = "rounds",
    params(
        ("room_id" = Uuid, Path, description = "Room identifier"),
        ("round_number" = i32, Path, description = "Round number (1-10)"),
        PlayerIdQuery,
    ),
    responses(
        (status = 200, description = "Round result", body = RoundResultResponse),
        (status = 404, description = "Result not available yet")
    )
)]
pub async fn get_round_result(
    State(state): State<SharedState>,
    Path((room_id, round_number)): Path<(Uuid, i32)>,
    Query(query): Query<PlayerIdQuery>,
) -> Result<Json<RoundResultResponse>, AppError> {
    let result =
        round_service::get_round_result(&state, room_id, round_number, query.player_id).await?;
    Ok(Json(result))
}

/// Send a message to the paired opponent (rounds 5-6 only).
#[utoipa::path(
    post,
    path = "/api/rooms/{room_id}/rounds/{round_number}/message",
    tag = "rounds",
    params(
        ("room_id" = Uuid, Path, description = "Room identifier"),
        ("round_number" = i32, Path, description = "Round number (1-10)"),
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message sent", body = OkResponse),
        (status = 400, description = "Wrong round, bad content or already sent"),
        (status = 404, description = "Room or round not found")
    )
)]
pub async fn send_message(
    State(state): State<SharedState>,
    Path((room_id, round_number)): Path<(Uuid, i32)>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<OkResponse>, AppError> {
    payload
        .validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    message_service::send_message(
        &state,
        room_id,
        round_number,
        payload.sender_id,
        &payload.content,
    )
    .await?;
    Ok(Json(OkResponse::ok()))
}

/// The most recent message sent to the asking player this round.
#[utoipa::path(
    get,
    path = "/api/rooms/{room_id}/rounds/{round_number}/message",
    tag = "rounds",
    params(
        ("room_id" = Uuid, Path, description = "Room identifier"),
        ("round_number" = i32, Path, description = "Round number (1-10)"),
        PlayerIdQuery,
    ),
    responses(
        (status = 200, description = "Opponent message", body = MessageResponse),
        (status = 404, description = "No message found")
    )
)]
pub async fn get_message(
    State(state): State<SharedState>,
    Path((room_id, round_number)): Path<(Uuid, i32)>,
    Query(query): Query<PlayerIdQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    let message =
        message_service::get_message(&state, room_id, round_number, query.player_id).await?;
    Ok(Json(message))
}

/// Assign identity indicators to every player (host endpoint, once).
#[utoipa::path(
    post,
    path = "/api/rooms/{room_id}/indicators/assign",
    tag = "rounds",
    params(("room_id" = Uuid, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Indicators assigned", body = OkResponse),
        (status = 400, description = "Too early or already assigned"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn assign_indicators(
    State(state): State<SharedState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<OkResponse>, AppError> {
    indicator_service::assign_indicators(&state, room_id).await?;
    Ok(Json(OkResponse::ok()))
}

/// The symbol assigned to the asking player.
#[utoipa::path(
    get,
    path = "/api/rooms/{room_id}/indicator",
    tag = "rounds",
    params(
        ("room_id" = Uuid, Path, description = "Room identifier"),
        PlayerIdQuery,
    ),
    responses(
        (status = 200, description = "Indicator symbol", body = IndicatorResponse),
        (status = 404, description = "Indicator not assigned")
    )
)]
pub async fn get_indicator(
    State(state): State<SharedState>,
    Path(room_id): Path<Uuid>,
    Query(query): Query<PlayerIdQuery>,
) -> Result<Json<IndicatorResponse>, AppError> {
    let indicator = indicator_service::get_indicator(&state, room_id, query.player_id).await?;
    Ok(Json(indicator))
}
