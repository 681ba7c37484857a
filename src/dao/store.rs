//! Persistence primitives over PostgreSQL.
//!
//! Every function takes an executor so it can run against the pool or inside
//! a transaction; the `lock_*` variants issue `SELECT ... FOR UPDATE` and are
//! only meaningful inside a transaction. Version bumps are funnelled through
//! [`bump_state_version`], the single place that touches `state_version`.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::dao::models::{
    ActionRecord, Choice, IndicatorRecord, MessageRecord, PairRecord, PlayerRecord, RoomRecord,
    RoomStatus, RoundPhase, RoundRecord, RoundStatus,
};
use crate::dao::schema;

/// Create tables and indexes when they do not exist yet.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in schema::MIGRATIONS {
        sqlx::query(statement).execute(pool).await?;
    }
    for statement in schema::CREATE_INDEXES {
        sqlx::query(statement).execute(pool).await?;
    }
    debug!("database schema ensured");
    Ok(())
}

// ---------------------------------------------------------------------------
// Rooms
// ---------------------------------------------------------------------------

pub async fn insert_room(
    executor: impl PgExecutor<'_>,
    code: &str,
) -> Result<RoomRecord, sqlx::Error> {
    let row = sqlx::query("INSERT INTO rooms (id, code) VALUES ($1, $2) RETURNING *")
        .bind(Uuid::new_v4())
        .bind(code)
        .fetch_one(executor)
        .await?;
    RoomRecord::from_row(&row)
}

pub async fn find_room(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
) -> Result<Option<RoomRecord>, sqlx::Error> {
    sqlx::query("SELECT * FROM rooms WHERE id = $1")
        .bind(room_id)
        .fetch_optional(executor)
        .await?
        .map(|row| RoomRecord::from_row(&row))
        .transpose()
}

pub async fn find_room_by_code(
    executor: impl PgExecutor<'_>,
    code: &str,
) -> Result<Option<RoomRecord>, sqlx::Error> {
    sqlx::query("SELECT * FROM rooms WHERE code = $1")
        .bind(code)
        .fetch_optional(executor)
        .await?
        .map(|row| RoomRecord::from_row(&row))
        .transpose()
}

/// Row-level lock on the room; the serialization point for room transitions.
pub async fn lock_room(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
) -> Result<Option<RoomRecord>, sqlx::Error> {
    sqlx::query("SELECT * FROM rooms WHERE id = $1 FOR UPDATE")
        .bind(room_id)
        .fetch_optional(executor)
        .await?
        .map(|row| RoomRecord::from_row(&row))
        .transpose()
}

pub async fn code_in_use(
    executor: impl PgExecutor<'_>,
    code: &str,
) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rooms WHERE code = $1")
        .bind(code)
        .fetch_one(executor)
        .await?;
    Ok(count > 0)
}

pub async fn set_room_status(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
    status: RoomStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE rooms SET status = $2, updated_at = now() WHERE id = $1")
        .bind(room_id)
        .bind(status.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn set_current_round(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
    current_round: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE rooms SET current_round = $2, updated_at = now() WHERE id = $1")
        .bind(room_id)
        .bind(current_round)
        .execute(executor)
        .await?;
    Ok(())
}

/// Increment the room's `state_version` and touch `updated_at`, signalling
/// polling clients that something observable changed. Returns the new
/// version, or `None` when the room does not exist.
pub async fn bump_state_version(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        "UPDATE rooms SET state_version = state_version + 1, updated_at = now() \
         WHERE id = $1 RETURNING state_version",
    )
    .bind(room_id)
    .fetch_optional(executor)
    .await
}

/// Rooms ordered by most recent activity, with their non-host player counts.
pub async fn list_rooms(
    executor: impl PgExecutor<'_>,
    status: Option<RoomStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<(RoomRecord, i64)>, sqlx::Error> {
    let base = "SELECT r.*, \
                (SELECT COUNT(*) FROM players p WHERE p.room_id = r.id AND NOT p.is_host) \
                AS player_count \
                FROM rooms r";
    let rows = match status {
        Some(status) => {
            sqlx::query(&format!(
                "{base} WHERE r.status = $1 ORDER BY r.updated_at DESC LIMIT $2 OFFSET $3"
            ))
            .bind(status.as_str())
            .bind(limit)
            .bind(offset)
            .fetch_all(executor)
            .await?
        }
        None => {
            sqlx::query(&format!(
                "{base} ORDER BY r.updated_at DESC LIMIT $1 OFFSET $2"
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(executor)
            .await?
        }
    };

    rows.into_iter()
        .map(|row| {
            use sqlx::Row;
            let count: i64 = row.try_get("player_count")?;
            Ok((RoomRecord::from_row(&row)?, count))
        })
        .collect()
}

pub async fn count_rooms(
    executor: impl PgExecutor<'_>,
    status: Option<RoomStatus>,
) -> Result<i64, sqlx::Error> {
    match status {
        Some(status) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM rooms WHERE status = $1")
                .bind(status.as_str())
                .fetch_one(executor)
                .await
        }
        None => sqlx::query_scalar("SELECT COUNT(*) FROM rooms").fetch_one(executor).await,
    }
}

/// Delete a room; children cascade at the database level.
pub async fn delete_room(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
        .bind(room_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete all rooms in the given statuses whose last activity predates the
/// cutoff, returning (id, code) of every victim for logging.
pub async fn delete_rooms_idle_since(
    executor: impl PgExecutor<'_>,
    statuses: &[RoomStatus],
    cutoff: DateTime<Utc>,
) -> Result<Vec<(Uuid, String)>, sqlx::Error> {
    let statuses: Vec<&str> = statuses.iter().map(RoomStatus::as_str).collect();
    let rows = sqlx::query(
        "DELETE FROM rooms WHERE updated_at < $1 AND status = ANY($2) RETURNING id, code",
    )
    .bind(cutoff)
    .bind(&statuses)
    .fetch_all(executor)
    .await?;

    rows.into_iter()
        .map(|row| {
            use sqlx::Row;
            Ok((row.try_get("id")?, row.try_get("code")?))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

pub async fn insert_player(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
    nickname: &str,
    display_name: &str,
    is_host: bool,
) -> Result<PlayerRecord, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO players (id, room_id, nickname, display_name, is_host) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(room_id)
    .bind(nickname)
    .bind(display_name)
    .bind(is_host)
    .fetch_one(executor)
    .await?;
    PlayerRecord::from_row(&row)
}

pub async fn find_player(
    executor: impl PgExecutor<'_>,
    player_id: Uuid,
) -> Result<Option<PlayerRecord>, sqlx::Error> {
    sqlx::query("SELECT * FROM players WHERE id = $1")
        .bind(player_id)
        .fetch_optional(executor)
        .await?
        .map(|row| PlayerRecord::from_row(&row))
        .transpose()
}

pub async fn list_players(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
) -> Result<Vec<PlayerRecord>, sqlx::Error> {
    let rows = sqlx::query("SELECT * FROM players WHERE room_id = $1 ORDER BY joined_at")
        .bind(room_id)
        .fetch_all(executor)
        .await?;
    rows.iter().map(PlayerRecord::from_row).collect()
}

pub async fn list_non_host_players(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
) -> Result<Vec<PlayerRecord>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT * FROM players WHERE room_id = $1 AND NOT is_host ORDER BY joined_at",
    )
    .bind(room_id)
    .fetch_all(executor)
    .await?;
    rows.iter().map(PlayerRecord::from_row).collect()
}

pub async fn count_non_host_players(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM players WHERE room_id = $1 AND NOT is_host")
        .bind(room_id)
        .fetch_one(executor)
        .await
}

// ---------------------------------------------------------------------------
// Rounds
// ---------------------------------------------------------------------------

pub async fn insert_round(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
    round_number: i32,
    phase: RoundPhase,
) -> Result<RoundRecord, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO rounds (id, room_id, round_number, phase) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(room_id)
    .bind(round_number)
    .bind(phase.as_str())
    .fetch_one(executor)
    .await?;
    RoundRecord::from_row(&row)
}

pub async fn find_round(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
    round_number: i32,
) -> Result<Option<RoundRecord>, sqlx::Error> {
    sqlx::query("SELECT * FROM rounds WHERE room_id = $1 AND round_number = $2")
        .bind(room_id)
        .bind(round_number)
        .fetch_optional(executor)
        .await?
        .map(|row| RoundRecord::from_row(&row))
        .transpose()
}

/// Row-level lock on the round; serializes submission, finalization,
/// publication and skip against each other.
pub async fn lock_round(
    executor: impl PgExecutor<'_>,
    round_id: Uuid,
) -> Result<Option<RoundRecord>, sqlx::Error> {
    sqlx::query("SELECT * FROM rounds WHERE id = $1 FOR UPDATE")
        .bind(round_id)
        .fetch_optional(executor)
        .await?
        .map(|row| RoundRecord::from_row(&row))
        .transpose()
}

pub async fn set_round_status(
    executor: impl PgExecutor<'_>,
    round_id: Uuid,
    status: RoundStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE rounds SET status = $2 WHERE id = $1")
        .bind(round_id)
        .bind(status.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

/// Move a round to `completed`, stamping `ended_at` and the skip flag.
pub async fn complete_round(
    executor: impl PgExecutor<'_>,
    round_id: Uuid,
    skipped: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE rounds SET status = 'completed', ended_at = now(), skipped = $2 WHERE id = $1")
        .bind(round_id)
        .bind(skipped)
        .execute(executor)
        .await?;
    Ok(())
}

/// Re-phase every round of the room with number >= `from_number`. Used to
/// flip rounds 7-10 to the indicator phase once symbols are assigned.
pub async fn set_round_phase_from(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
    from_number: i32,
    phase: RoundPhase,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE rounds SET phase = $3 WHERE room_id = $1 AND round_number >= $2")
            .bind(room_id)
            .bind(from_number)
            .bind(phase.as_str())
            .execute(executor)
            .await?;
    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Pairs
// ---------------------------------------------------------------------------

pub async fn insert_pair(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
    round_id: Uuid,
    player1_id: Uuid,
    player2_id: Uuid,
) -> Result<PairRecord, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO pairs (id, room_id, round_id, player1_id, player2_id) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(room_id)
    .bind(round_id)
    .bind(player1_id)
    .bind(player2_id)
    .fetch_one(executor)
    .await?;
    PairRecord::from_row(&row)
}

pub async fn pairs_in_round(
    executor: impl PgExecutor<'_>,
    round_id: Uuid,
) -> Result<Vec<PairRecord>, sqlx::Error> {
    let rows = sqlx::query("SELECT * FROM pairs WHERE round_id = $1")
        .bind(round_id)
        .fetch_all(executor)
        .await?;
    rows.iter().map(PairRecord::from_row).collect()
}

pub async fn find_pair_for_player(
    executor: impl PgExecutor<'_>,
    round_id: Uuid,
    player_id: Uuid,
) -> Result<Option<PairRecord>, sqlx::Error> {
    sqlx::query(
        "SELECT * FROM pairs WHERE round_id = $1 AND (player1_id = $2 OR player2_id = $2)",
    )
    .bind(round_id)
    .bind(player_id)
    .fetch_optional(executor)
    .await?
    .map(|row| PairRecord::from_row(&row))
    .transpose()
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

pub async fn insert_action(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
    round_id: Uuid,
    player_id: Uuid,
    choice: Choice,
) -> Result<ActionRecord, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO actions (id, room_id, round_id, player_id, choice) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(room_id)
    .bind(round_id)
    .bind(player_id)
    .bind(choice.as_str())
    .fetch_one(executor)
    .await?;
    ActionRecord::from_row(&row)
}

pub async fn find_action(
    executor: impl PgExecutor<'_>,
    round_id: Uuid,
    player_id: Uuid,
) -> Result<Option<ActionRecord>, sqlx::Error> {
    sqlx::query("SELECT * FROM actions WHERE round_id = $1 AND player_id = $2")
        .bind(round_id)
        .bind(player_id)
        .fetch_optional(executor)
        .await?
        .map(|row| ActionRecord::from_row(&row))
        .transpose()
}

pub async fn actions_in_round(
    executor: impl PgExecutor<'_>,
    round_id: Uuid,
) -> Result<Vec<ActionRecord>, sqlx::Error> {
    let rows = sqlx::query("SELECT * FROM actions WHERE round_id = $1")
        .bind(round_id)
        .fetch_all(executor)
        .await?;
    rows.iter().map(ActionRecord::from_row).collect()
}

pub async fn count_actions(
    executor: impl PgExecutor<'_>,
    round_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM actions WHERE round_id = $1")
        .bind(round_id)
        .fetch_one(executor)
        .await
}

pub async fn set_action_payoff(
    executor: impl PgExecutor<'_>,
    action_id: Uuid,
    payoff: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE actions SET payoff = $2 WHERE id = $1")
        .bind(action_id)
        .bind(payoff)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn count_room_actions(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM actions WHERE room_id = $1")
        .bind(room_id)
        .fetch_one(executor)
        .await
}

pub async fn count_room_actions_by_choice(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
    choice: Choice,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM actions WHERE room_id = $1 AND choice = $2")
        .bind(room_id)
        .bind(choice.as_str())
        .fetch_one(executor)
        .await
}

/// Sum of published payoffs across all rounds for one player.
pub async fn total_payoff(
    executor: impl PgExecutor<'_>,
    player_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COALESCE(SUM(payoff), 0)::BIGINT FROM actions WHERE player_id = $1",
    )
    .bind(player_id)
    .fetch_one(executor)
    .await
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

pub async fn insert_message(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
    round_id: Uuid,
    sender_id: Uuid,
    receiver_id: Uuid,
    content: &str,
) -> Result<MessageRecord, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO messages (id, room_id, round_id, sender_id, receiver_id, content) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(room_id)
    .bind(round_id)
    .bind(sender_id)
    .bind(receiver_id)
    .bind(content)
    .fetch_one(executor)
    .await?;
    MessageRecord::from_row(&row)
}

pub async fn sender_message_exists(
    executor: impl PgExecutor<'_>,
    round_id: Uuid,
    sender_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE round_id = $1 AND sender_id = $2")
            .bind(round_id)
            .bind(sender_id)
            .fetch_one(executor)
            .await?;
    Ok(count > 0)
}

pub async fn latest_message_for_receiver(
    executor: impl PgExecutor<'_>,
    round_id: Uuid,
    receiver_id: Uuid,
) -> Result<Option<MessageRecord>, sqlx::Error> {
    sqlx::query(
        "SELECT * FROM messages WHERE round_id = $1 AND receiver_id = $2 \
         ORDER BY created_at DESC LIMIT 1",
    )
    .bind(round_id)
    .bind(receiver_id)
    .fetch_optional(executor)
    .await?
    .map(|row| MessageRecord::from_row(&row))
    .transpose()
}

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

pub async fn insert_indicator(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
    player_id: Uuid,
    symbol: &str,
) -> Result<IndicatorRecord, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO indicators (id, room_id, player_id, symbol) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(room_id)
    .bind(player_id)
    .bind(symbol)
    .fetch_one(executor)
    .await?;
    IndicatorRecord::from_row(&row)
}

pub async fn room_has_indicators(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM indicators WHERE room_id = $1")
        .bind(room_id)
        .fetch_one(executor)
        .await?;
    Ok(count > 0)
}

pub async fn find_indicator(
    executor: impl PgExecutor<'_>,
    room_id: Uuid,
    player_id: Uuid,
) -> Result<Option<IndicatorRecord>, sqlx::Error> {
    sqlx::query("SELECT * FROM indicators WHERE room_id = $1 AND player_id = $2")
        .bind(room_id)
        .bind(player_id)
        .fetch_optional(executor)
        .await?
        .map(|row| IndicatorRecord::from_row(&row))
        .transpose()
}
