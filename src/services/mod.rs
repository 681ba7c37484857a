/// Periodic deletion of stale rooms.
pub mod cleanup;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// One-shot identity indicator assignment.
pub mod indicator_service;
/// Opponent messages for rounds 5-6.
pub mod message_service;
/// Opponent pairing logic.
pub mod pairing;
/// Room lifecycle operations.
pub mod room_service;
/// Round lifecycle and the submission/finalization concurrency core.
pub mod round_service;
/// Versioned polling snapshot builder.
pub mod state_service;
