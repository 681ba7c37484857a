//! End-to-end flows through the service layer against a live PostgreSQL.
//!
//! These tests need a database; point `DATABASE_URL` at a scratch instance
//! and run with `cargo test -- --ignored`. Every test creates its own room,
//! so they can share one database.

use std::collections::HashSet;

use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use chicken_game_back::dao::models::{Choice, RoomStatus, RoundStatus};
use chicken_game_back::dao::store;
use chicken_game_back::error::ServiceError;
use chicken_game_back::services::{
    indicator_service, message_service, room_service, round_service, state_service,
};
use chicken_game_back::state::{AppState, SharedState};

async fn test_state() -> SharedState {
    let url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/chicken_game_test".to_string());
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("failed to connect to test database");
    store::run_migrations(&pool).await.expect("failed to run migrations");
    AppState::from_pool(pool)
}

/// Create a room, join two players and start the game.
async fn two_player_game(state: &SharedState) -> (Uuid, Uuid, Uuid) {
    let created = room_service::create_room(state).await.expect("create room");
    let alice = room_service::join_room(state, &created.code, "Alice")
        .await
        .expect("join alice");
    let bob = room_service::join_room(state, &created.code, "Bob")
        .await
        .expect("join bob");
    room_service::start_game(state, created.room_id).await.expect("start game");
    (created.room_id, alice.player_id, bob.player_id)
}

async fn current_version(state: &SharedState, room_id: Uuid) -> i64 {
    store::find_room(state.db(), room_id)
        .await
        .expect("find room")
        .expect("room exists")
        .state_version
}

async fn round_status(state: &SharedState, room_id: Uuid, round_number: i32) -> RoundStatus {
    store::find_round(state.db(), room_id, round_number)
        .await
        .expect("find round")
        .expect("round exists")
        .status
}

/// Submit for both players, publish, and advance to the next round.
async fn play_round(state: &SharedState, room_id: Uuid, round_number: i32, players: &[Uuid]) {
    for player_id in players {
        round_service::submit_action(state, room_id, round_number, *player_id, Choice::Turn)
            .await
            .expect("submit");
    }
    round_service::publish_round(state, room_id, round_number)
        .await
        .expect("publish");
    room_service::next_round(state, room_id).await.expect("next round");
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn happy_two_player_round() {
    let state = test_state().await;
    let (room_id, alice, bob) = two_player_game(&state).await;

    let after_start = current_version(&state, room_id).await;
    assert!(after_start >= 2, "create + start must bump the version");

    round_service::submit_action(&state, room_id, 1, alice, Choice::Accelerate)
        .await
        .expect("alice submits");
    assert_eq!(round_status(&state, room_id, 1).await, RoundStatus::WaitingActions);

    round_service::submit_action(&state, room_id, 1, bob, Choice::Turn)
        .await
        .expect("bob submits");
    assert_eq!(round_status(&state, room_id, 1).await, RoundStatus::ReadyToPublish);

    let before_publish = current_version(&state, room_id).await;
    assert!(before_publish >= after_start + 2, "each submission bumps the version");

    round_service::publish_round(&state, room_id, 1).await.expect("publish");
    assert_eq!(round_status(&state, room_id, 1).await, RoundStatus::Completed);

    let result = round_service::get_round_result(&state, room_id, 1, alice)
        .await
        .expect("alice result");
    assert_eq!(result.your_choice, Choice::Accelerate);
    assert_eq!(result.opponent_choice, Choice::Turn);
    assert_eq!(result.your_payoff, 10);
    assert_eq!(result.opponent_payoff, -3);
    assert_eq!(result.opponent_display_name, "Bob");

    let result = round_service::get_round_result(&state, room_id, 1, bob)
        .await
        .expect("bob result");
    assert_eq!(result.your_payoff, -3);
    assert_eq!(result.opponent_payoff, 10);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn duplicate_submission_is_idempotent() {
    let state = test_state().await;
    let (room_id, alice, _bob) = two_player_game(&state).await;

    round_service::submit_action(&state, room_id, 1, alice, Choice::Accelerate)
        .await
        .expect("first submit");
    let after_first = current_version(&state, room_id).await;

    round_service::submit_action(&state, room_id, 1, alice, Choice::Accelerate)
        .await
        .expect("duplicate submit succeeds");
    assert_eq!(current_version(&state, room_id).await, after_first);

    // A conflicting retry keeps the stored choice and still succeeds.
    round_service::submit_action(&state, room_id, 1, alice, Choice::Turn)
        .await
        .expect("conflicting retry succeeds");
    let stored = store::find_round(state.db(), room_id, 1)
        .await
        .unwrap()
        .unwrap();
    let action = store::find_action(state.db(), stored.id, alice).await.unwrap().unwrap();
    assert_eq!(action.choice, Choice::Accelerate);
    assert_eq!(current_version(&state, room_id).await, after_first);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn skip_fills_missing_submissions_with_turn() {
    let state = test_state().await;
    let (room_id, alice, bob) = two_player_game(&state).await;

    round_service::submit_action(&state, room_id, 1, alice, Choice::Turn)
        .await
        .expect("alice submits");

    round_service::skip_round(&state, room_id, 1).await.expect("skip");
    assert_eq!(round_status(&state, room_id, 1).await, RoundStatus::Completed);

    let result = round_service::get_round_result(&state, room_id, 1, alice)
        .await
        .expect("alice result");
    assert_eq!(result.your_choice, Choice::Turn);
    assert_eq!(result.opponent_choice, Choice::Turn);
    assert_eq!(result.your_payoff, 3);
    assert_eq!(result.opponent_payoff, 3);

    let round = store::find_round(state.db(), room_id, 1).await.unwrap().unwrap();
    assert!(round.skipped);
    let bob_action = store::find_action(state.db(), round.id, bob).await.unwrap().unwrap();
    assert_eq!(bob_action.choice, Choice::Turn);

    // Skipping a completed round is a state error, not a crash.
    let err = round_service::skip_round(&state, room_id, 1).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn polling_versions_are_monotonic() {
    let state = test_state().await;
    let (room_id, alice, _bob) = two_player_game(&state).await;

    let snapshot = state_service::build_room_state(&state, room_id, 0, None)
        .await
        .expect("initial poll");
    assert!(snapshot.has_update);
    let version = snapshot.version;
    assert!(version > 0);

    let unchanged = state_service::build_room_state(&state, room_id, version, None)
        .await
        .expect("re-poll");
    assert!(!unchanged.has_update);
    assert_eq!(unchanged.version, version);
    assert!(unchanged.data.is_none());

    round_service::submit_action(&state, room_id, 1, alice, Choice::Turn)
        .await
        .expect("submit");

    let updated = state_service::build_room_state(&state, room_id, version, Some(alice))
        .await
        .expect("poll after submit");
    assert!(updated.has_update);
    assert!(updated.version > version);

    let data = updated.data.expect("payload present");
    let round = data.round.expect("round present");
    assert_eq!(round.submitted_actions, 1);
    assert_eq!(round.total_players, 2);
    assert_eq!(round.your_choice, Some(Choice::Turn));
    // Nothing about the opponent leaks before publication.
    assert!(round.opponent_choice.is_none());
    assert!(round.your_payoff.is_none());
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn message_round_constraints() {
    let state = test_state().await;
    let (room_id, alice, bob) = two_player_game(&state).await;

    // Messages are rejected outside rounds 5-6.
    let err = message_service::send_message(&state, room_id, 1, alice, "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    for round_number in 1..=4 {
        play_round(&state, room_id, round_number, &[alice, bob]).await;
    }

    message_service::send_message(&state, room_id, 5, alice, "hi")
        .await
        .expect("first message");

    let err = message_service::send_message(&state, room_id, 5, alice, "hi again")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let err = message_service::send_message(&state, room_id, 5, bob, &"x".repeat(101))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let received = message_service::get_message(&state, room_id, 5, bob)
        .await
        .expect("bob reads message");
    assert_eq!(received.content, "hi");
    assert!(received.from_opponent);

    // Alice has no message yet.
    let err = message_service::get_message(&state, room_id, 5, alice).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn indicator_lifecycle_and_balance() {
    let state = test_state().await;
    let created = room_service::create_room(&state).await.expect("create room");
    let mut players = Vec::new();
    for index in 0..4 {
        let joined = room_service::join_room(&state, &created.code, &format!("P{index}"))
            .await
            .expect("join");
        players.push(joined.player_id);
    }
    let room_id = created.room_id;
    room_service::start_game(&state, room_id).await.expect("start");

    // Too early before round 6.
    let err = indicator_service::assign_indicators(&state, room_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    for round_number in 1..=5 {
        play_round(&state, room_id, round_number, &players).await;
    }

    indicator_service::assign_indicators(&state, room_id).await.expect("assign");
    let err = indicator_service::assign_indicators(&state, room_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let mut symbols = Vec::new();
    for player_id in &players {
        let indicator = indicator_service::get_indicator(&state, room_id, *player_id)
            .await
            .expect("indicator assigned");
        assert!(indicator_service::INDICATOR_SYMBOLS.contains(&indicator.symbol.as_str()));
        symbols.push(indicator.symbol);
    }
    // Round-robin dealing keeps groups within one of each other.
    let distinct: HashSet<&String> = symbols.iter().collect();
    assert_eq!(distinct.len(), symbols.len().min(indicator_service::INDICATOR_SYMBOLS.len()));
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn pairings_stay_fixed_across_rounds() {
    let state = test_state().await;
    let created = room_service::create_room(&state).await.expect("create room");
    let mut players = Vec::new();
    for index in 0..6 {
        let joined = room_service::join_room(&state, &created.code, &format!("P{index}"))
            .await
            .expect("join");
        players.push(joined.player_id);
    }
    let room_id = created.room_id;
    room_service::start_game(&state, room_id).await.expect("start");

    play_round(&state, room_id, 1, &players).await;

    let normalize = |pairs: Vec<chicken_game_back::dao::models::PairRecord>| {
        pairs
            .into_iter()
            .map(|pair| {
                let mut ids = [pair.player1_id, pair.player2_id];
                ids.sort();
                (ids[0], ids[1])
            })
            .collect::<HashSet<_>>()
    };

    let round1 = store::find_round(state.db(), room_id, 1).await.unwrap().unwrap();
    let round2 = store::find_round(state.db(), room_id, 2).await.unwrap().unwrap();
    let pairs1 = normalize(store::pairs_in_round(state.db(), round1.id).await.unwrap());
    let pairs2 = normalize(store::pairs_in_round(state.db(), round2.id).await.unwrap());
    assert_eq!(pairs1, pairs2);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn start_rejects_unpairable_rosters() {
    let state = test_state().await;
    let created = room_service::create_room(&state).await.expect("create room");
    let room_id = created.room_id;

    // No players at all.
    let err = room_service::start_game(&state, room_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    for index in 0..3 {
        room_service::join_room(&state, &created.code, &format!("P{index}"))
            .await
            .expect("join");
    }

    // Odd roster.
    let err = room_service::start_game(&state, room_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let room = store::find_room(state.db(), room_id).await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::Waiting);
    assert_eq!(room.current_round, 0);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn next_round_is_idempotent_after_advance() {
    let state = test_state().await;
    let (room_id, alice, bob) = two_player_game(&state).await;

    for player_id in [alice, bob] {
        round_service::submit_action(&state, room_id, 1, player_id, Choice::Turn)
            .await
            .expect("submit");
    }
    round_service::publish_round(&state, room_id, 1).await.expect("publish");

    let advanced = room_service::next_round(&state, room_id).await.expect("advance");
    assert_eq!(advanced, 2);

    // A retry after the advance answers with the same round number.
    let retried = room_service::next_round(&state, room_id).await.expect("retry");
    assert_eq!(retried, 2);

    // Once someone submits, advancing again is a state error.
    round_service::submit_action(&state, room_id, 2, alice, Choice::Turn)
        .await
        .expect("submit in round 2");
    let err = room_service::next_round(&state, room_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn publish_is_idempotent_and_guarded() {
    let state = test_state().await;
    let (room_id, alice, bob) = two_player_game(&state).await;

    // Publishing before anyone submitted is rejected.
    let err = round_service::publish_round(&state, room_id, 1).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    for player_id in [alice, bob] {
        round_service::submit_action(&state, room_id, 1, player_id, Choice::Accelerate)
            .await
            .expect("submit");
    }

    round_service::publish_round(&state, room_id, 1).await.expect("publish");
    let version = current_version(&state, room_id).await;

    // The second publish is a no-op success.
    round_service::publish_round(&state, room_id, 1).await.expect("republish");
    assert_eq!(current_version(&state, room_id).await, version);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn summary_ranks_players_by_total_payoff() {
    let state = test_state().await;
    let (room_id, alice, bob) = two_player_game(&state).await;

    round_service::submit_action(&state, room_id, 1, alice, Choice::Accelerate)
        .await
        .expect("alice submits");
    round_service::submit_action(&state, room_id, 1, bob, Choice::Turn)
        .await
        .expect("bob submits");
    round_service::publish_round(&state, room_id, 1).await.expect("publish");
    room_service::end_game(&state, room_id).await.expect("end");

    let summary = room_service::game_summary(&state, room_id).await.expect("summary");
    assert_eq!(summary.players.len(), 2);
    assert_eq!(summary.players[0].display_name, "Alice");
    assert_eq!(summary.players[0].total_payoff, 10);
    assert_eq!(summary.players[1].total_payoff, -3);
    assert_eq!(summary.stats.accelerate_ratio, 0.5);
    assert_eq!(summary.stats.turn_ratio, 0.5);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn deleting_a_room_cascades() {
    let state = test_state().await;
    let (room_id, alice, _bob) = two_player_game(&state).await;

    room_service::delete_room(&state, room_id).await.expect("delete");

    assert!(store::find_room(state.db(), room_id).await.unwrap().is_none());
    assert!(store::find_player(state.db(), alice).await.unwrap().is_none());
    assert!(store::find_round(state.db(), room_id, 1).await.unwrap().is_none());

    let err = room_service::delete_room(&state, room_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}
