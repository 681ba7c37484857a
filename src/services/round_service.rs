//! Round lifecycle: action submission, finalization, publication and skip.
//!
//! All mutations run inside one transaction and serialize on a row-level
//! lock on the round. Any submitter whose action completes the roster runs
//! finalization in the same transaction; the lock plus the status guard make
//! the payoff calculation happen exactly once regardless of who races whom.

use std::collections::HashMap;

use sqlx::PgConnection;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dao::models::{ActionRecord, Choice, PlayerRecord, RoomStatus, RoundRecord, RoundStatus};
use crate::dao::store;
use crate::dto::round::{PairResponse, RoundCurrentResponse, RoundResultResponse};
use crate::error::ServiceError;
use crate::game::{payoff, state_machine};
use crate::state::SharedState;

/// Current round of the room.
pub async fn get_current_round(
    state: &SharedState,
    room_id: Uuid,
) -> Result<RoundCurrentResponse, ServiceError> {
    let room = store::find_room(state.db(), room_id)
        .await?
        .ok_or_else(ServiceError::room_not_found)?;
    if room.current_round == 0 {
        return Err(ServiceError::NotFound("no active round".into()));
    }

    let round = store::find_round(state.db(), room_id, room.current_round)
        .await?
        .ok_or_else(ServiceError::round_not_found)?;

    Ok(RoundCurrentResponse {
        round_number: round.round_number,
        phase: round.phase,
        status: round.status,
    })
}

/// The asking player's opponent for the given round.
pub async fn get_pair(
    state: &SharedState,
    room_id: Uuid,
    round_number: i32,
    player_id: Uuid,
) -> Result<PairResponse, ServiceError> {
    let round = store::find_round(state.db(), room_id, round_number)
        .await?
        .ok_or_else(ServiceError::round_not_found)?;

    let opponent_id = opponent_in_round(state.db(), round.id, player_id).await?;
    let opponent = store::find_player(state.db(), opponent_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("opponent not found".into()))?;

    Ok(PairResponse {
        opponent_id,
        opponent_display_name: opponent.display_name,
    })
}

/// Submit a player's choice for a round. Idempotent: a repeated submission
/// returns success without changing anything, and a conflicting retry keeps
/// the stored choice. The submission that completes the roster finalizes the
/// round in the same transaction.
pub async fn submit_action(
    state: &SharedState,
    room_id: Uuid,
    round_number: i32,
    player_id: Uuid,
    choice: Choice,
) -> Result<(), ServiceError> {
    let mut tx = state.db().begin().await?;

    let room = store::find_room(&mut *tx, room_id)
        .await?
        .ok_or_else(ServiceError::room_not_found)?;
    if room.status != RoomStatus::Playing {
        return Err(ServiceError::InvalidState(format!(
            "room is not playing (status: {})",
            room.status
        )));
    }

    let round = store::find_round(&mut *tx, room_id, round_number)
        .await?
        .ok_or_else(ServiceError::round_not_found)?;
    let player = require_participant(&mut *tx, room_id, player_id).await?;

    // Serialization point: everything below runs under the round lock.
    let round = store::lock_round(&mut *tx, round.id)
        .await?
        .ok_or_else(ServiceError::round_not_found)?;

    if round.status == RoundStatus::Completed {
        return Err(ServiceError::InvalidState(
            "round is already completed".into(),
        ));
    }

    store::find_pair_for_player(&mut *tx, round.id, player_id)
        .await?
        .ok_or_else(|| {
            ServiceError::InvalidInput("player is not a participant in this round".into())
        })?;

    if let Some(existing) = store::find_action(&mut *tx, round.id, player_id).await? {
        if existing.choice != choice {
            debug!(
                %player_id,
                round_id = %round.id,
                stored = %existing.choice,
                incoming = %choice,
                "duplicate submission with a different choice; keeping stored value"
            );
        }
        // Duplicate retry: no state change, no version bump.
        tx.commit().await?;
        return Ok(());
    }

    if round.status != RoundStatus::WaitingActions {
        return Err(ServiceError::InvalidState(format!(
            "cannot submit in round status {}",
            round.status
        )));
    }

    store::insert_action(&mut *tx, room_id, round.id, player_id, choice).await?;
    store::bump_state_version(&mut *tx, room_id).await?;
    info!(player_id = %player.id, round_id = %round.id, %choice, "action submitted");

    let submitted = store::count_actions(&mut *tx, round.id).await?;
    let expected = store::count_non_host_players(&mut *tx, room_id).await?;
    if submitted == expected {
        finalize_round(&mut *tx, &round).await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Publish the results of a finalized round. Idempotent: publishing a
/// completed round succeeds without effect.
pub async fn publish_round(
    state: &SharedState,
    room_id: Uuid,
    round_number: i32,
) -> Result<(), ServiceError> {
    let mut tx = state.db().begin().await?;

    let round = store::find_round(&mut *tx, room_id, round_number)
        .await?
        .ok_or_else(ServiceError::round_not_found)?;
    let round = store::lock_round(&mut *tx, round.id)
        .await?
        .ok_or_else(ServiceError::round_not_found)?;

    if round.status == RoundStatus::Completed {
        tx.commit().await?;
        return Ok(());
    }
    if round.status == RoundStatus::WaitingActions {
        return Err(ServiceError::InvalidState(
            "cannot publish round in status waiting_actions".into(),
        ));
    }

    state_machine::ensure_round_transition(round.status, RoundStatus::Completed)?;
    store::complete_round(&mut *tx, round.id, false).await?;
    store::bump_state_version(&mut *tx, room_id).await?;
    tx.commit().await?;

    info!(%room_id, round_number, "round published");
    Ok(())
}

/// Host emergency: fill in TURN for every missing submission, compute the
/// payoffs and complete the round immediately.
pub async fn skip_round(
    state: &SharedState,
    room_id: Uuid,
    round_number: i32,
) -> Result<(), ServiceError> {
    let mut tx = state.db().begin().await?;

    let round = store::find_round(&mut *tx, room_id, round_number)
        .await?
        .ok_or_else(ServiceError::round_not_found)?;
    let round = store::lock_round(&mut *tx, round.id)
        .await?
        .ok_or_else(ServiceError::round_not_found)?;

    if round.status == RoundStatus::Completed {
        return Err(ServiceError::InvalidState(
            "cannot skip round in status completed".into(),
        ));
    }

    let pairs = store::pairs_in_round(&mut *tx, round.id).await?;
    for pair in &pairs {
        for participant in [pair.player1_id, pair.player2_id] {
            if store::find_action(&mut *tx, round.id, participant).await?.is_none() {
                info!(player_id = %participant, round_id = %round.id, "auto-submitting TURN for skip");
                store::insert_action(&mut *tx, room_id, round.id, participant, Choice::Turn)
                    .await?;
            }
        }
    }

    if round.status == RoundStatus::WaitingActions {
        apply_payoffs(&mut *tx, round.id).await?;
    }

    state_machine::ensure_round_transition(round.status, RoundStatus::Completed)?;
    store::complete_round(&mut *tx, round.id, true).await?;
    store::bump_state_version(&mut *tx, room_id).await?;
    tx.commit().await?;

    info!(%room_id, round_number, "round skipped and completed");
    Ok(())
}

/// Published outcome of a round from one player's perspective.
pub async fn get_round_result(
    state: &SharedState,
    room_id: Uuid,
    round_number: i32,
    player_id: Uuid,
) -> Result<RoundResultResponse, ServiceError> {
    let round = store::find_round(state.db(), room_id, round_number)
        .await?
        .ok_or_else(ServiceError::round_not_found)?;

    // Results become visible on publication, not on finalization.
    if round.status != RoundStatus::Completed {
        return Err(ServiceError::NotFound("result not available yet".into()));
    }

    let own_action = store::find_action(state.db(), round.id, player_id).await?;
    let Some(own_action) = own_action else {
        return Err(ServiceError::NotFound("result not available yet".into()));
    };
    let Some(your_payoff) = own_action.payoff else {
        return Err(ServiceError::NotFound("result not available yet".into()));
    };

    let opponent_id = opponent_in_round(state.db(), round.id, player_id).await?;
    let opponent = store::find_player(state.db(), opponent_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("opponent not found".into()))?;
    let opponent_action = store::find_action(state.db(), round.id, opponent_id).await?;
    let Some(opponent_action) = opponent_action else {
        return Err(ServiceError::NotFound("result not available yet".into()));
    };
    let Some(opponent_payoff) = opponent_action.payoff else {
        return Err(ServiceError::NotFound("result not available yet".into()));
    };

    Ok(RoundResultResponse {
        opponent_display_name: opponent.display_name,
        your_choice: own_action.choice,
        opponent_choice: opponent_action.choice,
        your_payoff,
        opponent_payoff,
    })
}

/// Finalize a round whose roster is complete: compute and persist the
/// payoffs, then move to ready_to_publish. The caller must hold the round
/// lock; the status guard makes repeated calls no-ops.
async fn finalize_round(
    conn: &mut PgConnection,
    round: &RoundRecord,
) -> Result<(), ServiceError> {
    if round.status != RoundStatus::WaitingActions {
        return Ok(());
    }

    apply_payoffs(&mut *conn, round.id).await?;
    state_machine::ensure_round_transition(round.status, RoundStatus::ReadyToPublish)?;
    store::set_round_status(&mut *conn, round.id, RoundStatus::ReadyToPublish).await?;

    info!(round_id = %round.id, round_number = round.round_number, "round finalized, ready to publish");
    Ok(())
}

/// Compute both payoffs for every pair of the round and persist them onto
/// the actions. Every participant must have submitted.
async fn apply_payoffs(conn: &mut PgConnection, round_id: Uuid) -> Result<(), ServiceError> {
    let pairs = store::pairs_in_round(&mut *conn, round_id).await?;
    let actions = store::actions_in_round(&mut *conn, round_id).await?;
    let by_player: HashMap<Uuid, &ActionRecord> =
        actions.iter().map(|action| (action.player_id, action)).collect();

    for pair in &pairs {
        let action1 = by_player.get(&pair.player1_id).ok_or_else(|| {
            ServiceError::InvalidState("missing action for a paired player".into())
        })?;
        let action2 = by_player.get(&pair.player2_id).ok_or_else(|| {
            ServiceError::InvalidState("missing action for a paired player".into())
        })?;

        let (payoff1, payoff2) = payoff::payoffs(action1.choice, action2.choice);
        store::set_action_payoff(&mut *conn, action1.id, payoff1).await?;
        store::set_action_payoff(&mut *conn, action2.id, payoff2).await?;
    }

    Ok(())
}

/// Look up a player and require them to be a non-host member of the room.
async fn require_participant(
    conn: &mut PgConnection,
    room_id: Uuid,
    player_id: Uuid,
) -> Result<PlayerRecord, ServiceError> {
    let player = store::find_player(&mut *conn, player_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("player not found".into()))?;
    if player.room_id != room_id {
        return Err(ServiceError::NotFound("player not found in this room".into()));
    }
    if player.is_host {
        return Err(ServiceError::InvalidInput("host cannot submit actions".into()));
    }
    Ok(player)
}

/// The opponent of `player_id` in the given round.
async fn opponent_in_round(
    pool: &sqlx::PgPool,
    round_id: Uuid,
    player_id: Uuid,
) -> Result<Uuid, ServiceError> {
    let pair = store::find_pair_for_player(pool, round_id, player_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound("no pair found for this player in this round".into())
        })?;
    pair.opponent_of(player_id).ok_or_else(|| {
        ServiceError::NotFound("no pair found for this player in this round".into())
    })
}
