//! One-shot identity indicators: after round 6 the host reveals which emoji
//! group each player belongs to.

use rand::seq::SliceRandom;
use tracing::info;
use uuid::Uuid;

use crate::dao::models::RoundPhase;
use crate::dao::store;
use crate::dto::round::IndicatorResponse;
use crate::error::ServiceError;
use crate::game::phases::{INDICATOR_ASSIGN_FROM_ROUND, INDICATOR_FROM_ROUND};
use crate::state::SharedState;

/// Closed whitelist of indicator symbols.
pub const INDICATOR_SYMBOLS: &[&str] = &["🦊", "🐼", "🦁", "🐸", "🦉", "🐙", "🦄", "🐢"];

/// Assign one symbol to every non-host player in a single atomic batch.
///
/// Players and symbols are both shuffled, then symbols are dealt round-robin
/// so the group sizes stay within one of each other.
pub async fn assign_indicators(state: &SharedState, room_id: Uuid) -> Result<(), ServiceError> {
    let mut tx = state.db().begin().await?;
    let room = store::lock_room(&mut *tx, room_id)
        .await?
        .ok_or_else(ServiceError::room_not_found)?;

    if room.current_round < INDICATOR_ASSIGN_FROM_ROUND {
        return Err(ServiceError::InvalidState(format!(
            "indicators can only be assigned after round {INDICATOR_ASSIGN_FROM_ROUND}"
        )));
    }
    if store::room_has_indicators(&mut *tx, room_id).await? {
        return Err(ServiceError::Conflict("indicators already assigned".into()));
    }

    let mut players = store::list_non_host_players(&mut *tx, room_id).await?;
    let mut symbols: Vec<&str> = INDICATOR_SYMBOLS.to_vec();
    {
        let mut rng = rand::thread_rng();
        players.shuffle(&mut rng);
        symbols.shuffle(&mut rng);
    }

    for (index, player) in players.iter().enumerate() {
        store::insert_indicator(&mut *tx, room_id, player.id, deal_symbol(index, &symbols))
            .await?;
    }

    // Late rounds that already exist become indicator rounds for display.
    store::set_round_phase_from(&mut *tx, room_id, INDICATOR_FROM_ROUND, RoundPhase::Indicator)
        .await?;
    store::bump_state_version(&mut *tx, room_id).await?;
    tx.commit().await?;

    info!(%room_id, player_count = players.len(), "indicators assigned");
    Ok(())
}

/// The symbol assigned to one player, or not-found before assignment.
pub async fn get_indicator(
    state: &SharedState,
    room_id: Uuid,
    player_id: Uuid,
) -> Result<IndicatorResponse, ServiceError> {
    let indicator = store::find_indicator(state.db(), room_id, player_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("indicator not assigned".into()))?;
    Ok(IndicatorResponse {
        symbol: indicator.symbol,
    })
}

/// Round-robin deal over the shuffled whitelist.
fn deal_symbol<'a>(index: usize, symbols: &[&'a str]) -> &'a str {
    symbols[index % symbols.len()]
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn deal_is_ceil_balanced_for_any_roster_size() {
        for player_count in 1..=60 {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for index in 0..player_count {
                *counts.entry(deal_symbol(index, INDICATOR_SYMBOLS)).or_default() += 1;
            }

            let max = counts.values().copied().max().unwrap();
            let min = if counts.len() == INDICATOR_SYMBOLS.len() {
                counts.values().copied().min().unwrap()
            } else {
                0
            };
            assert!(max - min <= 1, "unbalanced deal for {player_count} players");
        }
    }

    #[test]
    fn whitelist_is_non_empty_and_distinct() {
        let mut symbols: Vec<&str> = INDICATOR_SYMBOLS.to_vec();
        symbols.sort();
        symbols.dedup();
        assert_eq!(symbols.len(), INDICATOR_SYMBOLS.len());
        assert!(!INDICATOR_SYMBOLS.is_empty());
    }
}
