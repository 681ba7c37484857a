//! DDL executed at startup to create the schema when it does not exist.
//!
//! Every child table cascades from `rooms`, so deleting a room removes the
//! whole containment tree in one statement.

/// SQL for creating the rooms table.
pub const CREATE_ROOMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS rooms (
    id UUID PRIMARY KEY,
    code VARCHAR(6) NOT NULL UNIQUE,
    status TEXT NOT NULL DEFAULT 'WAITING',
    current_round INTEGER NOT NULL DEFAULT 0,
    state_version BIGINT NOT NULL DEFAULT 1,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

/// SQL for creating the players table.
pub const CREATE_PLAYERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS players (
    id UUID PRIMARY KEY,
    room_id UUID REFERENCES rooms(id) ON DELETE CASCADE NOT NULL,
    nickname VARCHAR(50) NOT NULL,
    display_name VARCHAR(50) NOT NULL,
    is_host BOOLEAN NOT NULL DEFAULT FALSE,
    joined_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

/// SQL for creating the rounds table.
pub const CREATE_ROUNDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS rounds (
    id UUID PRIMARY KEY,
    room_id UUID REFERENCES rooms(id) ON DELETE CASCADE NOT NULL,
    round_number INTEGER NOT NULL,
    phase TEXT NOT NULL DEFAULT 'NORMAL',
    status TEXT NOT NULL DEFAULT 'waiting_actions',
    skipped BOOLEAN NOT NULL DEFAULT FALSE,
    started_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    ended_at TIMESTAMPTZ,
    UNIQUE (room_id, round_number)
)
"#;

/// SQL for creating the pairs table.
pub const CREATE_PAIRS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS pairs (
    id UUID PRIMARY KEY,
    room_id UUID REFERENCES rooms(id) ON DELETE CASCADE NOT NULL,
    round_id UUID REFERENCES rounds(id) ON DELETE CASCADE NOT NULL,
    player1_id UUID REFERENCES players(id) ON DELETE CASCADE NOT NULL,
    player2_id UUID REFERENCES players(id) ON DELETE CASCADE NOT NULL
)
"#;

/// SQL for creating the actions table. The unique index is the backstop for
/// idempotent submission: at most one action per (round, player).
pub const CREATE_ACTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS actions (
    id UUID PRIMARY KEY,
    room_id UUID REFERENCES rooms(id) ON DELETE CASCADE NOT NULL,
    round_id UUID REFERENCES rounds(id) ON DELETE CASCADE NOT NULL,
    player_id UUID REFERENCES players(id) ON DELETE CASCADE NOT NULL,
    choice TEXT NOT NULL,
    payoff INTEGER,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (round_id, player_id)
)
"#;

/// SQL for creating the messages table. At most one message per
/// (round, sender).
pub const CREATE_MESSAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id UUID PRIMARY KEY,
    room_id UUID REFERENCES rooms(id) ON DELETE CASCADE NOT NULL,
    round_id UUID REFERENCES rounds(id) ON DELETE CASCADE NOT NULL,
    sender_id UUID REFERENCES players(id) ON DELETE CASCADE NOT NULL,
    receiver_id UUID REFERENCES players(id) ON DELETE CASCADE NOT NULL,
    content VARCHAR(100) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (round_id, sender_id)
)
"#;

/// SQL for creating the indicators table. At most one indicator per player.
pub const CREATE_INDICATORS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS indicators (
    id UUID PRIMARY KEY,
    room_id UUID REFERENCES rooms(id) ON DELETE CASCADE NOT NULL,
    player_id UUID REFERENCES players(id) ON DELETE CASCADE NOT NULL UNIQUE,
    symbol VARCHAR(10) NOT NULL
)
"#;

/// Secondary indexes used by the hot query paths, one statement each.
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_rooms_status_updated ON rooms (status, updated_at)",
    "CREATE INDEX IF NOT EXISTS idx_players_room_id ON players (room_id)",
    "CREATE INDEX IF NOT EXISTS idx_rounds_room_id ON rounds (room_id)",
    "CREATE INDEX IF NOT EXISTS idx_pairs_round_id ON pairs (round_id)",
    "CREATE INDEX IF NOT EXISTS idx_actions_round_id ON actions (round_id)",
    "CREATE INDEX IF NOT EXISTS idx_actions_room_id ON actions (room_id)",
    "CREATE INDEX IF NOT EXISTS idx_messages_round_id ON messages (round_id)",
    "CREATE INDEX IF NOT EXISTS idx_indicators_room_id ON indicators (room_id)",
];

/// All table statements in dependency order.
pub const MIGRATIONS: &[&str] = &[
    CREATE_ROOMS_TABLE,
    CREATE_PLAYERS_TABLE,
    CREATE_ROUNDS_TABLE,
    CREATE_PAIRS_TABLE,
    CREATE_ACTIONS_TABLE,
    CREATE_MESSAGES_TABLE,
    CREATE_INDICATORS_TABLE,
];
