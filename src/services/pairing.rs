//! Opponent pairing.
//!
//! Round 1 shuffles the non-host players and pairs consecutive entries;
//! every later round replicates round 1 so opponents stay fixed for the
//! whole game.

use rand::seq::SliceRandom;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::dao::models::{PairRecord, PlayerRecord};
use crate::dao::store;
use crate::error::ServiceError;

/// Shuffle the players and chunk them into opponent pairs.
///
/// Rejects rosters that cannot be fully paired.
pub fn shuffle_into_pairs(players: &[PlayerRecord]) -> Result<Vec<(Uuid, Uuid)>, ServiceError> {
    if players.len() < 2 {
        return Err(ServiceError::InvalidInput(format!(
            "invalid player count: need at least 2 players to start, got {}",
            players.len()
        )));
    }
    if players.len() % 2 != 0 {
        return Err(ServiceError::InvalidInput(format!(
            "invalid player count: must be even, got {}",
            players.len()
        )));
    }

    let mut ids: Vec<Uuid> = players.iter().map(|player| player.id).collect();
    ids.shuffle(&mut rand::thread_rng());

    Ok(ids.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect())
}

/// Build and persist the round-1 pairing for the given roster.
pub async fn create_pairs_for_round(
    conn: &mut PgConnection,
    room_id: Uuid,
    round_id: Uuid,
    players: &[PlayerRecord],
) -> Result<Vec<PairRecord>, ServiceError> {
    let mut pairs = Vec::with_capacity(players.len() / 2);
    for (player1_id, player2_id) in shuffle_into_pairs(players)? {
        let pair =
            store::insert_pair(&mut *conn, room_id, round_id, player1_id, player2_id).await?;
        pairs.push(pair);
    }
    Ok(pairs)
}

/// Replicate the pairing of an earlier round into a new round.
pub async fn copy_pairs_from_round(
    conn: &mut PgConnection,
    room_id: Uuid,
    source_round_id: Uuid,
    target_round_id: Uuid,
) -> Result<Vec<PairRecord>, ServiceError> {
    let source_pairs = store::pairs_in_round(&mut *conn, source_round_id).await?;
    if source_pairs.is_empty() {
        return Err(ServiceError::InvalidState(
            "no pairs found in the source round".into(),
        ));
    }

    let mut pairs = Vec::with_capacity(source_pairs.len());
    for source in source_pairs {
        let pair = store::insert_pair(
            &mut *conn,
            room_id,
            target_round_id,
            source.player1_id,
            source.player2_id,
        )
        .await?;
        pairs.push(pair);
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn roster(count: usize) -> Vec<PlayerRecord> {
        (0..count)
            .map(|index| PlayerRecord {
                id: Uuid::new_v4(),
                room_id: Uuid::new_v4(),
                nickname: format!("player-{index}"),
                display_name: format!("player-{index}"),
                is_host: false,
                joined_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn every_player_lands_in_exactly_one_pair() {
        let players = roster(6);
        let pairs = shuffle_into_pairs(&players).unwrap();
        assert_eq!(pairs.len(), 3);

        let mut seen: Vec<Uuid> = pairs.iter().flat_map(|(a, b)| [*a, *b]).collect();
        seen.sort();
        let mut expected: Vec<Uuid> = players.iter().map(|p| p.id).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn odd_roster_is_rejected() {
        let err = shuffle_into_pairs(&roster(5)).unwrap_err();
        match err {
            ServiceError::InvalidInput(message) => {
                assert!(message.contains("invalid player count"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn undersized_roster_is_rejected() {
        assert!(shuffle_into_pairs(&roster(0)).is_err());
        assert!(shuffle_into_pairs(&roster(1)).is_err());
    }
}
