//! Database record types and the enums shared across the service layer.
//!
//! Enums are stored as TEXT and transmitted over the wire verbatim, so the
//! serde names below double as the database encoding.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, postgres::PgRow};
use utoipa::ToSchema;
use uuid::Uuid;

/// Room lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Waiting => "WAITING",
            RoomStatus::Playing => "PLAYING",
            RoomStatus::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "WAITING" => Ok(RoomStatus::Waiting),
            "PLAYING" => Ok(RoomStatus::Playing),
            "FINISHED" => Ok(RoomStatus::Finished),
            other => Err(format!("unknown room status `{other}`")),
        }
    }
}

/// Round lifecycle status within a playing room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    WaitingActions,
    ReadyToPublish,
    Completed,
}

impl RoundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundStatus::WaitingActions => "waiting_actions",
            RoundStatus::ReadyToPublish => "ready_to_publish",
            RoundStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "waiting_actions" => Ok(RoundStatus::WaitingActions),
            "ready_to_publish" => Ok(RoundStatus::ReadyToPublish),
            "completed" => Ok(RoundStatus::Completed),
            other => Err(format!("unknown round status `{other}`")),
        }
    }
}

/// Display phase of a round (rounds 5-6 allow messages; rounds 7-10 show
/// identity indicators once they are assigned).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundPhase {
    Normal,
    Message,
    Indicator,
}

impl RoundPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundPhase::Normal => "NORMAL",
            RoundPhase::Message => "MESSAGE",
            RoundPhase::Indicator => "INDICATOR",
        }
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundPhase {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "NORMAL" => Ok(RoundPhase::Normal),
            "MESSAGE" => Ok(RoundPhase::Message),
            "INDICATOR" => Ok(RoundPhase::Indicator),
            other => Err(format!("unknown round phase `{other}`")),
        }
    }
}

/// A player's move in the Chicken game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Choice {
    Turn,
    Accelerate,
}

impl Choice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::Turn => "TURN",
            Choice::Accelerate => "ACCELERATE",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Choice {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "TURN" => Ok(Choice::Turn),
            "ACCELERATE" => Ok(Choice::Accelerate),
            other => Err(format!("unknown choice `{other}`")),
        }
    }
}

/// Decode a TEXT column into one of the enums above, reporting a column
/// decode error so the failure surfaces like any other sqlx type mismatch.
fn parse_column<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|message: String| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: message.into(),
    })
}

/// A classroom room hosting one iterated Chicken game.
#[derive(Debug, Clone)]
pub struct RoomRecord {
    pub id: Uuid,
    pub code: String,
    pub status: RoomStatus,
    pub current_round: i32,
    pub state_version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoomRecord {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            code: row.try_get("code")?,
            status: parse_column(row, "status")?,
            current_round: row.try_get("current_round")?,
            state_version: row.try_get("state_version")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// A participant of a room. Exactly one player per room carries `is_host`.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub id: Uuid,
    pub room_id: Uuid,
    pub nickname: String,
    pub display_name: String,
    pub is_host: bool,
    pub joined_at: DateTime<Utc>,
}

impl PlayerRecord {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            room_id: row.try_get("room_id")?,
            nickname: row.try_get("nickname")?,
            display_name: row.try_get("display_name")?,
            is_host: row.try_get("is_host")?,
            joined_at: row.try_get("joined_at")?,
        })
    }
}

/// One of the (up to) ten rounds of a game.
#[derive(Debug, Clone)]
pub struct RoundRecord {
    pub id: Uuid,
    pub room_id: Uuid,
    pub round_number: i32,
    pub phase: RoundPhase,
    pub status: RoundStatus,
    pub skipped: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl RoundRecord {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            room_id: row.try_get("room_id")?,
            round_number: row.try_get("round_number")?,
            phase: parse_column(row, "phase")?,
            status: parse_column(row, "status")?,
            skipped: row.try_get("skipped")?,
            started_at: row.try_get("started_at")?,
            ended_at: row.try_get("ended_at")?,
        })
    }
}

/// An unordered opponent relation between two non-host players in a round.
#[derive(Debug, Clone)]
pub struct PairRecord {
    pub id: Uuid,
    pub room_id: Uuid,
    pub round_id: Uuid,
    pub player1_id: Uuid,
    pub player2_id: Uuid,
}

impl PairRecord {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            room_id: row.try_get("room_id")?,
            round_id: row.try_get("round_id")?,
            player1_id: row.try_get("player1_id")?,
            player2_id: row.try_get("player2_id")?,
        })
    }

    /// The other member of the pair, or `None` when the player is not part
    /// of this pair at all.
    pub fn opponent_of(&self, player_id: Uuid) -> Option<Uuid> {
        if self.player1_id == player_id {
            Some(self.player2_id)
        } else if self.player2_id == player_id {
            Some(self.player1_id)
        } else {
            None
        }
    }
}

/// A player's submitted move for a round; `payoff` stays empty until the
/// round is finalized and is never overwritten afterwards.
#[derive(Debug, Clone)]
pub struct ActionRecord {
    pub id: Uuid,
    pub room_id: Uuid,
    pub round_id: Uuid,
    pub player_id: Uuid,
    pub choice: Choice,
    pub payoff: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl ActionRecord {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            room_id: row.try_get("room_id")?,
            round_id: row.try_get("round_id")?,
            player_id: row.try_get("player_id")?,
            choice: parse_column(row, "choice")?,
            payoff: row.try_get("payoff")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// A one-shot message between paired opponents (rounds 5-6 only).
#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub id: Uuid,
    pub room_id: Uuid,
    pub round_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            room_id: row.try_get("room_id")?,
            round_id: row.try_get("round_id")?,
            sender_id: row.try_get("sender_id")?,
            receiver_id: row.try_get("receiver_id")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// The emoji identity symbol assigned to a player after round 6.
#[derive(Debug, Clone)]
pub struct IndicatorRecord {
    pub id: Uuid,
    pub room_id: Uuid,
    pub player_id: Uuid,
    pub symbol: String,
}

impl IndicatorRecord {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            room_id: row.try_get("room_id")?,
            player_id: row.try_get("player_id")?,
            symbol: row.try_get("symbol")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_round_trips_through_database_encoding() {
        for status in [RoomStatus::Waiting, RoomStatus::Playing, RoomStatus::Finished] {
            assert_eq!(status.as_str().parse::<RoomStatus>().unwrap(), status);
        }
        for status in [
            RoundStatus::WaitingActions,
            RoundStatus::ReadyToPublish,
            RoundStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<RoundStatus>().unwrap(), status);
        }
        for phase in [RoundPhase::Normal, RoundPhase::Message, RoundPhase::Indicator] {
            assert_eq!(phase.as_str().parse::<RoundPhase>().unwrap(), phase);
        }
        for choice in [Choice::Turn, Choice::Accelerate] {
            assert_eq!(choice.as_str().parse::<Choice>().unwrap(), choice);
        }
    }

    #[test]
    fn wire_encoding_matches_database_encoding() {
        assert_eq!(
            serde_json::to_string(&RoundStatus::ReadyToPublish).unwrap(),
            "\"ready_to_publish\""
        );
        assert_eq!(serde_json::to_string(&RoomStatus::Playing).unwrap(), "\"PLAYING\"");
        assert_eq!(serde_json::to_string(&RoundPhase::Message).unwrap(), "\"MESSAGE\"");
        assert_eq!(serde_json::to_string(&Choice::Accelerate).unwrap(), "\"ACCELERATE\"");
    }

    #[test]
    fn unknown_encodings_are_rejected() {
        assert!("CALCULATING".parse::<RoundStatus>().is_err());
        assert!("waiting".parse::<RoomStatus>().is_err());
        assert!("SWERVE".parse::<Choice>().is_err());
    }

    #[test]
    fn pair_opponent_lookup() {
        let pair = PairRecord {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            round_id: Uuid::new_v4(),
            player1_id: Uuid::new_v4(),
            player2_id: Uuid::new_v4(),
        };

        assert_eq!(pair.opponent_of(pair.player1_id), Some(pair.player2_id));
        assert_eq!(pair.opponent_of(pair.player2_id), Some(pair.player1_id));
        assert_eq!(pair.opponent_of(Uuid::new_v4()), None);
    }
}
