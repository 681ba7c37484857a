//! Room lifecycle: creation, membership, start, round advancement, end,
//! deletion, listing and the end-of-game summary.

use tracing::{info, warn};
use uuid::Uuid;

use crate::dao::models::{Choice, RoomStatus, RoundStatus};
use crate::dao::store;
use crate::dto::room::{
    GameStats, GameSummaryResponse, PlayerJoinedResponse, PlayerSummary, RoomCreatedResponse,
    RoomListItem, RoomListQuery, RoomListResponse, RoomStatusResponse,
};
use crate::dto::validation::normalize_nickname;
use crate::error::ServiceError;
use crate::game::{codes, phases, state_machine};
use crate::services::pairing;
use crate::state::SharedState;

/// Display name given to the auto-created host player.
const HOST_DISPLAY_NAME: &str = "Host";
/// Default page size for the room listing.
const DEFAULT_LIST_LIMIT: i64 = 50;
/// Upper bound for the room listing page size.
const MAX_LIST_LIMIT: i64 = 200;

/// Create a room with a fresh code and its host player.
pub async fn create_room(state: &SharedState) -> Result<RoomCreatedResponse, ServiceError> {
    let mut tx = state.db().begin().await?;

    let mut code = codes::generate_room_code();
    while store::code_in_use(&mut *tx, &code).await? {
        warn!(code, "room code collision, regenerating");
        code = codes::generate_room_code();
    }

    let room = store::insert_room(&mut *tx, &code).await?;
    let host =
        store::insert_player(&mut *tx, room.id, HOST_DISPLAY_NAME, HOST_DISPLAY_NAME, true)
            .await?;

    tx.commit().await?;
    info!(room_id = %room.id, code = %room.code, "created room");

    Ok(RoomCreatedResponse {
        room_id: room.id,
        code: room.code,
        host_player_id: host.id,
    })
}

/// Join a waiting room under a nickname; the display name is the nickname.
pub async fn join_room(
    state: &SharedState,
    code: &str,
    nickname: &str,
) -> Result<PlayerJoinedResponse, ServiceError> {
    let nickname = normalize_nickname(nickname)?;

    let room = store::find_room_by_code(state.db(), code)
        .await?
        .ok_or_else(ServiceError::room_not_found)?;

    let mut tx = state.db().begin().await?;
    // Serialize against a concurrent StartGame so the roster cannot change
    // between the player-count check and the pairing.
    let room = store::lock_room(&mut *tx, room.id)
        .await?
        .ok_or_else(ServiceError::room_not_found)?;

    if room.status != RoomStatus::Waiting {
        return Err(ServiceError::InvalidState(format!(
            "room {} is not accepting players (status: {})",
            room.code, room.status
        )));
    }

    let player = store::insert_player(&mut *tx, room.id, &nickname, &nickname, false).await?;
    store::bump_state_version(&mut *tx, room.id).await?;
    tx.commit().await?;

    info!(player_id = %player.id, room_id = %room.id, nickname = %player.nickname, "player joined room");

    Ok(PlayerJoinedResponse {
        player_id: player.id,
        room_id: room.id,
        display_name: player.display_name,
    })
}

/// Start the game: move the room to PLAYING and create round 1 with its
/// pairing in a single transaction, so clients never observe a playing room
/// without a round.
pub async fn start_game(state: &SharedState, room_id: Uuid) -> Result<(), ServiceError> {
    let mut tx = state.db().begin().await?;
    let room = store::lock_room(&mut *tx, room_id)
        .await?
        .ok_or_else(ServiceError::room_not_found)?;

    state_machine::ensure_room_transition(room.status, RoomStatus::Playing)?;

    let players = store::list_non_host_players(&mut *tx, room_id).await?;
    let round =
        store::insert_round(&mut *tx, room_id, 1, phases::phase_for_round(1, false)).await?;
    let pairs = pairing::create_pairs_for_round(&mut *tx, room_id, round.id, &players).await?;

    store::set_room_status(&mut *tx, room_id, RoomStatus::Playing).await?;
    store::set_current_round(&mut *tx, room_id, 1).await?;
    store::bump_state_version(&mut *tx, room_id).await?;
    tx.commit().await?;

    info!(
        %room_id,
        player_count = players.len(),
        pair_count = pairs.len(),
        "game started"
    );
    Ok(())
}

/// Advance to the next round, replicating the round-1 pairing.
///
/// Requires the current round to be completed. A retry arriving after the
/// advance already happened (the newest round has no actions yet) returns
/// the current round number without creating anything.
pub async fn next_round(state: &SharedState, room_id: Uuid) -> Result<i32, ServiceError> {
    let mut tx = state.db().begin().await?;
    let room = store::lock_room(&mut *tx, room_id)
        .await?
        .ok_or_else(ServiceError::room_not_found)?;

    if room.status != RoomStatus::Playing {
        return Err(ServiceError::InvalidState(format!(
            "room is not playing (status: {})",
            room.status
        )));
    }
    if room.current_round == 0 {
        return Err(ServiceError::InvalidState("game has not started".into()));
    }

    let current = store::find_round(&mut *tx, room_id, room.current_round)
        .await?
        .ok_or_else(ServiceError::round_not_found)?;

    if current.status != RoundStatus::Completed {
        if current.status == RoundStatus::WaitingActions
            && store::count_actions(&mut *tx, current.id).await? == 0
        {
            // A previous call already advanced; answer idempotently.
            return Ok(current.round_number);
        }
        return Err(ServiceError::InvalidState(format!(
            "current round is not completed (status: {})",
            current.status
        )));
    }

    if room.current_round >= phases::MAX_ROUNDS {
        return Err(ServiceError::InvalidState("all rounds completed".into()));
    }

    let next_number = room.current_round + 1;
    let indicators_assigned = store::room_has_indicators(&mut *tx, room_id).await?;
    let round = store::insert_round(
        &mut *tx,
        room_id,
        next_number,
        phases::phase_for_round(next_number, indicators_assigned),
    )
    .await?;

    let first_round = store::find_round(&mut *tx, room_id, 1)
        .await?
        .ok_or_else(ServiceError::round_not_found)?;
    pairing::copy_pairs_from_round(&mut *tx, room_id, first_round.id, round.id).await?;

    store::set_current_round(&mut *tx, room_id, next_number).await?;
    store::bump_state_version(&mut *tx, room_id).await?;
    tx.commit().await?;

    info!(%room_id, round_number = next_number, phase = %round.phase, "round created");
    Ok(next_number)
}

/// End the game: move the room from PLAYING to FINISHED.
pub async fn end_game(state: &SharedState, room_id: Uuid) -> Result<(), ServiceError> {
    let mut tx = state.db().begin().await?;
    let room = store::lock_room(&mut *tx, room_id)
        .await?
        .ok_or_else(ServiceError::room_not_found)?;

    state_machine::ensure_room_transition(room.status, RoomStatus::Finished)?;
    store::set_room_status(&mut *tx, room_id, RoomStatus::Finished).await?;
    store::bump_state_version(&mut *tx, room_id).await?;
    tx.commit().await?;

    info!(%room_id, "game ended");
    Ok(())
}

/// Delete a room; every child entity cascades with it.
pub async fn delete_room(state: &SharedState, room_id: Uuid) -> Result<(), ServiceError> {
    let room = store::find_room(state.db(), room_id)
        .await?
        .ok_or_else(ServiceError::room_not_found)?;

    info!(%room_id, code = %room.code, status = %room.status, "deleting room");
    store::delete_room(state.db(), room_id).await?;
    Ok(())
}

/// Public status of a room looked up by its join code.
pub async fn get_room_by_code(
    state: &SharedState,
    code: &str,
) -> Result<RoomStatusResponse, ServiceError> {
    let room = store::find_room_by_code(state.db(), code)
        .await?
        .ok_or_else(ServiceError::room_not_found)?;
    let player_count = store::count_non_host_players(state.db(), room.id).await?;
    Ok(RoomStatusResponse::from_record(&room, player_count))
}

/// Paged listing of rooms for the admin view, most recently active first.
pub async fn list_rooms(
    state: &SharedState,
    query: RoomListQuery,
) -> Result<RoomListResponse, ServiceError> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(raw.to_uppercase().parse::<RoomStatus>().map_err(|_| {
            ServiceError::InvalidInput(format!("invalid status filter: {raw}"))
        })?),
        None => None,
    };

    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    if !(1..=MAX_LIST_LIMIT).contains(&limit) {
        return Err(ServiceError::InvalidInput(format!(
            "limit must be between 1 and {MAX_LIST_LIMIT}"
        )));
    }
    let offset = query.offset.unwrap_or(0);
    if offset < 0 {
        return Err(ServiceError::InvalidInput("offset must not be negative".into()));
    }

    let total = store::count_rooms(state.db(), status).await?;
    let rooms = store::list_rooms(state.db(), status, limit, offset)
        .await?
        .iter()
        .map(|(room, player_count)| RoomListItem::from_record(room, *player_count))
        .collect();

    Ok(RoomListResponse {
        rooms,
        total,
        limit,
        offset,
    })
}

/// End-of-game summary: ranking by total payoff plus strategy statistics.
pub async fn game_summary(
    state: &SharedState,
    room_id: Uuid,
) -> Result<GameSummaryResponse, ServiceError> {
    let _room = store::find_room(state.db(), room_id)
        .await?
        .ok_or_else(ServiceError::room_not_found)?;

    let mut players = Vec::new();
    for player in store::list_non_host_players(state.db(), room_id).await? {
        let total_payoff = store::total_payoff(state.db(), player.id).await?;
        players.push(PlayerSummary {
            display_name: player.display_name,
            total_payoff,
        });
    }
    players.sort_by(|a, b| b.total_payoff.cmp(&a.total_payoff));

    let total_actions = store::count_room_actions(state.db(), room_id).await?;
    let accelerate_count =
        store::count_room_actions_by_choice(state.db(), room_id, Choice::Accelerate).await?;

    let accelerate_ratio = if total_actions > 0 {
        round_ratio(accelerate_count as f64 / total_actions as f64)
    } else {
        0.0
    };
    let turn_ratio = if total_actions > 0 {
        round_ratio(1.0 - accelerate_count as f64 / total_actions as f64)
    } else {
        0.0
    };

    Ok(GameSummaryResponse {
        players,
        stats: GameStats {
            accelerate_ratio,
            turn_ratio,
        },
    })
}

fn round_ratio(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_round_to_two_decimals() {
        assert_eq!(round_ratio(1.0 / 3.0), 0.33);
        assert_eq!(round_ratio(2.0 / 3.0), 0.67);
        assert_eq!(round_ratio(0.0), 0.0);
        assert_eq!(round_ratio(1.0), 1.0);
    }
}
