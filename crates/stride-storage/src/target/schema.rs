//! Target relational schema, version 1.
//!
//! One STRICT table per migrating entity. Append-only entities are
//! keyed by the derived id; mutable per-user entities by their natural
//! key. Timestamps are epoch milliseconds copied from the legacy
//! documents, so recency comparisons see the same clock on both sides.

/// All entity table names, in backfill order.
pub const TARGET_TABLE_NAMES: [&str; 6] = [
    "check_ins",
    "action_plans",
    "coach_messages",
    "pillar_scores",
    "onboarding_profiles",
    "user_core_state",
];

pub const TARGET_SCHEMA_V1: &str = r#"
-- Append-only point-in-time facts, keyed by derived id.

CREATE TABLE IF NOT EXISTS check_ins (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    pillar_id TEXT NOT NULL,
    value REAL NOT NULL,
    note TEXT,
    logged_at INTEGER NOT NULL,
    created_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_check_ins_owner
    ON check_ins(user_id, pillar_id);
CREATE INDEX IF NOT EXISTS idx_check_ins_recency
    ON check_ins(created_at);

CREATE TABLE IF NOT EXISTS action_plans (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    pillar_id TEXT NOT NULL,
    title TEXT NOT NULL,
    steps TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_action_plans_owner
    ON action_plans(user_id, pillar_id);
CREATE INDEX IF NOT EXISTS idx_action_plans_recency
    ON action_plans(created_at);

CREATE TABLE IF NOT EXISTS coach_messages (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_coach_messages_owner
    ON coach_messages(user_id);
CREATE INDEX IF NOT EXISTS idx_coach_messages_recency
    ON coach_messages(created_at);

-- Mutable per-user documents, keyed by natural key.

CREATE TABLE IF NOT EXISTS pillar_scores (
    user_id TEXT NOT NULL,
    pillar_id TEXT NOT NULL,
    score REAL NOT NULL,
    streak INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, pillar_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_pillar_scores_recency
    ON pillar_scores(updated_at);

CREATE TABLE IF NOT EXISTS onboarding_profiles (
    user_id TEXT PRIMARY KEY,
    goals TEXT NOT NULL,
    timezone TEXT NOT NULL,
    completed_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_onboarding_profiles_recency
    ON onboarding_profiles(updated_at);

CREATE TABLE IF NOT EXISTS user_core_state (
    user_id TEXT PRIMARY KEY,
    momentum REAL NOT NULL,
    level INTEGER NOT NULL,
    last_check_in_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_user_core_state_recency
    ON user_core_state(updated_at);
"#;
