//! Round numbering rules: a game runs exactly ten rounds, rounds 5-6 allow
//! messages, and rounds 7-10 display identity indicators once assigned.

use crate::dao::models::RoundPhase;

/// Hard ceiling on rounds per game.
pub const MAX_ROUNDS: i32 = 10;
/// First round in which indicators can be revealed.
pub const INDICATOR_FROM_ROUND: i32 = 7;
/// Indicators may only be assigned once this round has been reached.
pub const INDICATOR_ASSIGN_FROM_ROUND: i32 = 6;

/// Whether opponents may exchange messages in this round.
pub fn is_message_round(round_number: i32) -> bool {
    matches!(round_number, 5 | 6)
}

/// Phase a newly created round starts in.
pub fn phase_for_round(round_number: i32, indicators_assigned: bool) -> RoundPhase {
    if is_message_round(round_number) {
        RoundPhase::Message
    } else if indicators_assigned && round_number >= INDICATOR_FROM_ROUND {
        RoundPhase::Indicator
    } else {
        RoundPhase::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_rounds_are_five_and_six() {
        let message_rounds: Vec<i32> = (1..=MAX_ROUNDS).filter(|n| is_message_round(*n)).collect();
        assert_eq!(message_rounds, vec![5, 6]);
    }

    #[test]
    fn phases_before_indicator_assignment() {
        assert_eq!(phase_for_round(1, false), RoundPhase::Normal);
        assert_eq!(phase_for_round(4, false), RoundPhase::Normal);
        assert_eq!(phase_for_round(5, false), RoundPhase::Message);
        assert_eq!(phase_for_round(6, false), RoundPhase::Message);
        assert_eq!(phase_for_round(7, false), RoundPhase::Normal);
        assert_eq!(phase_for_round(10, false), RoundPhase::Normal);
    }

    #[test]
    fn late_rounds_switch_to_indicator_phase_after_assignment() {
        assert_eq!(phase_for_round(7, true), RoundPhase::Indicator);
        assert_eq!(phase_for_round(10, true), RoundPhase::Indicator);
        // Assignment never rewrites earlier phases.
        assert_eq!(phase_for_round(5, true), RoundPhase::Message);
        assert_eq!(phase_for_round(4, true), RoundPhase::Normal);
    }
}
