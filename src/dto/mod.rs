use chrono::{DateTime, SecondsFormat, Utc};

/// Shared response envelopes.
pub mod common;
/// Health check data structures.
pub mod health;
/// Room, player and summary data structures.
pub mod room;
/// Round, action, message and indicator data structures.
pub mod round;
/// Versioned polling snapshot data structures.
pub mod state;
/// Request normalization and validation utilities.
pub mod validation;

/// Format a timestamp as an RFC 3339 string for transport.
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}
