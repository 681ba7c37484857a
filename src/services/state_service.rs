//! Versioned snapshot for the short-polling `/state` endpoint.
//!
//! The room's `state_version` is the sole synchronization primitive between
//! server and clients: a client that is already at the current version gets
//! a tiny no-update response, anyone behind gets the full personalized
//! snapshot built inside one read transaction.

use std::collections::HashSet;

use uuid::Uuid;

use crate::dao::models::{RoundStatus, RoundPhase};
use crate::dao::store;
use crate::dto::room::RoomStatusResponse;
use crate::dto::state::{
    MessageStatePayload, PlayerStatePayload, PlayerSubmissionStatus, RoomStatePayload,
    RoomStateResponse, RoundStatePayload,
};
use crate::error::ServiceError;
use crate::state::SharedState;

/// Build the snapshot for one polling client.
pub async fn build_room_state(
    state: &SharedState,
    room_id: Uuid,
    client_version: i64,
    player_id: Option<Uuid>,
) -> Result<RoomStateResponse, ServiceError> {
    let mut tx = state.db().begin().await?;

    let room = store::find_room(&mut *tx, room_id)
        .await?
        .ok_or_else(ServiceError::room_not_found)?;

    if room.state_version <= client_version {
        tx.commit().await?;
        return Ok(RoomStateResponse::unchanged(room.state_version));
    }

    let players = store::list_players(&mut *tx, room_id).await?;
    let player_count = players.iter().filter(|player| !player.is_host).count() as i64;
    let indicators_assigned = store::room_has_indicators(&mut *tx, room_id).await?;

    let mut round_payload = None;
    let mut message_payload = None;
    let mut indicator_symbol = None;

    if room.current_round > 0 {
        if let Some(round) = store::find_round(&mut *tx, room_id, room.current_round).await? {
            let actions = store::actions_in_round(&mut *tx, round.id).await?;
            let pairs = store::pairs_in_round(&mut *tx, round.id).await?;

            let participant_ids: HashSet<Uuid> = pairs
                .iter()
                .flat_map(|pair| [pair.player1_id, pair.player2_id])
                .collect();
            let submitted_ids: HashSet<Uuid> =
                actions.iter().map(|action| action.player_id).collect();

            let player_submissions = players
                .iter()
                .filter(|player| !player.is_host && participant_ids.contains(&player.id))
                .map(|player| PlayerSubmissionStatus {
                    player_id: player.id,
                    display_name: player.display_name.clone(),
                    submitted: submitted_ids.contains(&player.id),
                })
                .collect();

            let mut payload = RoundStatePayload {
                round_number: round.round_number,
                phase: round.phase,
                status: round.status,
                skipped: round.skipped,
                submitted_actions: submitted_ids.len() as i64,
                total_players: participant_ids.len() as i64,
                player_submissions,
                your_choice: None,
                opponent_choice: None,
                opponent_display_name: None,
                your_payoff: None,
                opponent_payoff: None,
            };

            if let Some(player_id) = player_id {
                let own_action = actions.iter().find(|action| action.player_id == player_id);
                payload.your_choice = own_action.map(|action| action.choice);

                // Opponent-facing fields stay hidden until publication.
                if round.status == RoundStatus::Completed {
                    payload.your_payoff = own_action.and_then(|action| action.payoff);

                    let opponent_id = pairs
                        .iter()
                        .find_map(|pair| pair.opponent_of(player_id));
                    if let Some(opponent_id) = opponent_id {
                        payload.opponent_display_name = players
                            .iter()
                            .find(|player| player.id == opponent_id)
                            .map(|player| player.display_name.clone());
                        if let Some(opponent_action) =
                            actions.iter().find(|action| action.player_id == opponent_id)
                        {
                            payload.opponent_choice = Some(opponent_action.choice);
                            payload.opponent_payoff = opponent_action.payoff;
                        }
                    }
                }

                if round.phase == RoundPhase::Message {
                    if let Some(message) =
                        store::latest_message_for_receiver(&mut *tx, round.id, player_id).await?
                    {
                        let from_display_name = players
                            .iter()
                            .find(|player| player.id == message.sender_id)
                            .map(|player| player.display_name.clone())
                            .unwrap_or_else(|| "Unknown".to_string());
                        message_payload = Some(MessageStatePayload {
                            round_number: round.round_number,
                            content: message.content,
                            from_player_id: message.sender_id,
                            from_display_name,
                        });
                    }
                }

                indicator_symbol = store::find_indicator(&mut *tx, room_id, player_id)
                    .await?
                    .map(|indicator| indicator.symbol);
            }

            round_payload = Some(payload);
        }
    }

    tx.commit().await?;

    let data = RoomStatePayload {
        room: RoomStatusResponse::from_record(&room, player_count),
        players: players
            .into_iter()
            .map(|player| PlayerStatePayload {
                player_id: player.id,
                display_name: player.display_name,
                is_host: player.is_host,
            })
            .collect(),
        round: round_payload,
        message: message_payload,
        indicator_symbol,
        indicators_assigned,
    };

    Ok(RoomStateResponse {
        version: room.state_version,
        has_update: true,
        data: Some(data),
    })
}
