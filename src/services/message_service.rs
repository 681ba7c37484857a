//! Opponent messages, allowed once per sender in rounds 5 and 6.

use tracing::info;
use uuid::Uuid;

use crate::dao::store;
use crate::dto::round::MessageResponse;
use crate::dto::validation::normalize_message_content;
use crate::error::ServiceError;
use crate::game::phases;
use crate::state::SharedState;

/// Send a message to the paired opponent. The receiver is derived from the
/// round's pairing; each sender may message at most once per round.
pub async fn send_message(
    state: &SharedState,
    room_id: Uuid,
    round_number: i32,
    sender_id: Uuid,
    content: &str,
) -> Result<(), ServiceError> {
    if !phases::is_message_round(round_number) {
        return Err(ServiceError::InvalidState(format!(
            "messages are not allowed in round {round_number}"
        )));
    }
    let content = normalize_message_content(content)?;

    let mut tx = state.db().begin().await?;

    let room = store::find_room(&mut *tx, room_id)
        .await?
        .ok_or_else(ServiceError::room_not_found)?;
    let round = store::find_round(&mut *tx, room_id, round_number)
        .await?
        .ok_or_else(ServiceError::round_not_found)?;

    let sender = store::find_player(&mut *tx, sender_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("player not found".into()))?;
    if sender.room_id != room.id || sender.is_host {
        return Err(ServiceError::InvalidInput(
            "sender cannot message in this room".into(),
        ));
    }

    let pair = store::find_pair_for_player(&mut *tx, round.id, sender_id)
        .await?
        .ok_or_else(|| {
            ServiceError::InvalidInput("player is not a participant in this round".into())
        })?;
    let receiver_id = pair.opponent_of(sender_id).ok_or_else(|| {
        ServiceError::InvalidInput("player is not a participant in this round".into())
    })?;

    if store::sender_message_exists(&mut *tx, round.id, sender_id).await? {
        return Err(ServiceError::Conflict(
            "already sent a message in this round".into(),
        ));
    }

    match store::insert_message(&mut *tx, room_id, round.id, sender_id, receiver_id, &content)
        .await
    {
        Ok(_) => {}
        // Unique-constraint backstop for a concurrent duplicate.
        Err(err) if is_unique_violation(&err) => {
            return Err(ServiceError::Conflict(
                "already sent a message in this round".into(),
            ));
        }
        Err(err) => return Err(err.into()),
    }

    store::bump_state_version(&mut *tx, room_id).await?;
    tx.commit().await?;

    info!(%sender_id, %receiver_id, round_number, "message sent");
    Ok(())
}

/// The most recent message addressed to `player_id` in the given round.
pub async fn get_message(
    state: &SharedState,
    room_id: Uuid,
    round_number: i32,
    player_id: Uuid,
) -> Result<MessageResponse, ServiceError> {
    let round = store::find_round(state.db(), room_id, round_number)
        .await?
        .ok_or_else(ServiceError::round_not_found)?;

    let message = store::latest_message_for_receiver(state.db(), round.id, player_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("no message found".into()))?;

    Ok(MessageResponse {
        content: message.content,
        from_opponent: true,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
