use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use validator::Validate;

use crate::{
    dto::room::{JoinRoomRequest, PlayerJoinedResponse},
    error::AppError,
    services::room_service,
    state::SharedState,
};

/// Routes handling player membership.
pub fn router() -> Router<SharedState> {
    Router::new().route("/rooms/{room}/join", post(join_room))
}

/// Join a waiting room under a nickname.
#[utoipa::path(
    post,
    path = "/api/rooms/{code}/join",
    tag = "players",
    params(("code" = String, Path, description = "6-character room code")),
    request_body = JoinRoomRequest,
    responses(
        (status = 200, description = "Player joined", body = PlayerJoinedResponse),
        (status = 400, description = "Room not accepting players or bad nickname"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn join_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<JoinRoomRequest>,
) -> Result<Json<PlayerJoinedResponse>, AppError> {
    payload
        .validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let joined = room_service::join_room(&state, &code, &payload.nickname).await?;
    Ok(Json(joined))
}
