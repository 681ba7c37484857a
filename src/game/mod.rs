/// Room code generation.
pub mod codes;
/// Payoff matrix of the Chicken game.
pub mod payoff;
/// Round numbering and phase derivation rules.
pub mod phases;
/// Valid room and round status transitions.
pub mod state_machine;
