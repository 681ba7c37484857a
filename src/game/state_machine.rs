//! Valid transitions for room and round statuses.
//!
//! Every status change in the service layer goes through the `ensure_*`
//! guards so illegal transitions fail fast with a deterministic error.

use crate::dao::models::{RoomStatus, RoundStatus};
use crate::error::ServiceError;

/// Whether a room may move from `from` to `to`.
///
/// WAITING -> PLAYING -> FINISHED, no back-transitions.
pub fn room_transition_allowed(from: RoomStatus, to: RoomStatus) -> bool {
    matches!(
        (from, to),
        (RoomStatus::Waiting, RoomStatus::Playing) | (RoomStatus::Playing, RoomStatus::Finished)
    )
}

/// Whether a round may move from `from` to `to`.
///
/// waiting_actions -> ready_to_publish (all actions in),
/// waiting_actions -> completed (skip),
/// ready_to_publish -> completed (publish or skip).
pub fn round_transition_allowed(from: RoundStatus, to: RoundStatus) -> bool {
    matches!(
        (from, to),
        (RoundStatus::WaitingActions, RoundStatus::ReadyToPublish)
            | (RoundStatus::WaitingActions, RoundStatus::Completed)
            | (RoundStatus::ReadyToPublish, RoundStatus::Completed)
    )
}

/// Guard a room transition, rejecting illegal moves.
pub fn ensure_room_transition(from: RoomStatus, to: RoomStatus) -> Result<(), ServiceError> {
    if room_transition_allowed(from, to) {
        Ok(())
    } else {
        Err(ServiceError::InvalidState(format!(
            "invalid state transition: room cannot move from {from} to {to}"
        )))
    }
}

/// Guard a round transition, rejecting illegal moves.
pub fn ensure_round_transition(from: RoundStatus, to: RoundStatus) -> Result<(), ServiceError> {
    if round_transition_allowed(from, to) {
        Ok(())
    } else {
        Err(ServiceError::InvalidState(format!(
            "invalid state transition: round cannot move from {from} to {to}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_happy_path() {
        assert!(room_transition_allowed(RoomStatus::Waiting, RoomStatus::Playing));
        assert!(room_transition_allowed(RoomStatus::Playing, RoomStatus::Finished));
    }

    #[test]
    fn room_rejects_everything_else() {
        assert!(!room_transition_allowed(RoomStatus::Waiting, RoomStatus::Finished));
        assert!(!room_transition_allowed(RoomStatus::Playing, RoomStatus::Waiting));
        assert!(!room_transition_allowed(RoomStatus::Finished, RoomStatus::Playing));
        assert!(!room_transition_allowed(RoomStatus::Finished, RoomStatus::Waiting));
        assert!(!room_transition_allowed(RoomStatus::Waiting, RoomStatus::Waiting));
    }

    #[test]
    fn round_happy_paths() {
        assert!(round_transition_allowed(
            RoundStatus::WaitingActions,
            RoundStatus::ReadyToPublish
        ));
        assert!(round_transition_allowed(
            RoundStatus::WaitingActions,
            RoundStatus::Completed
        ));
        assert!(round_transition_allowed(
            RoundStatus::ReadyToPublish,
            RoundStatus::Completed
        ));
    }

    #[test]
    fn round_rejects_back_transitions() {
        assert!(!round_transition_allowed(
            RoundStatus::ReadyToPublish,
            RoundStatus::WaitingActions
        ));
        assert!(!round_transition_allowed(
            RoundStatus::Completed,
            RoundStatus::ReadyToPublish
        ));
        assert!(!round_transition_allowed(
            RoundStatus::Completed,
            RoundStatus::WaitingActions
        ));
    }

    #[test]
    fn guard_reports_invalid_transition() {
        let err = ensure_round_transition(RoundStatus::Completed, RoundStatus::Completed)
            .unwrap_err();
        match err {
            ServiceError::InvalidState(message) => {
                assert!(message.contains("invalid state transition"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
