//! `SQLite` schema definitions for regattacheck.
//!
//! Four logical tables back the system: the roster (keyed by class +
//! normalized sail), the append-only event ledger, the dolly tracker (keyed
//! by class + bow), and a key/value meta table holding the readiness
//! singleton and the schema version.

/// SQL statement to create the roster table.
pub const CREATE_ROSTER_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS roster (
    id TEXT PRIMARY KEY,
    class_name TEXT NOT NULL,
    country TEXT,
    sail TEXT NOT NULL,
    bow INTEGER NOT NULL,
    crew TEXT NOT NULL,
    club TEXT NOT NULL,
    sail_norm TEXT NOT NULL
)
";

/// Secondary index on the normalized sail number for wildcard-class lookup.
pub const CREATE_ROSTER_SAIL_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_roster_sail ON roster(sail_norm)
";

/// Secondary index on class name for per-class counts.
pub const CREATE_ROSTER_CLASS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_roster_class ON roster(class_name)
";

/// SQL statement to create the events table.
pub const CREATE_EVENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,
    ts TEXT NOT NULL,
    action TEXT NOT NULL,
    class_name TEXT NOT NULL,
    country TEXT,
    sail TEXT NOT NULL,
    sail_norm TEXT NOT NULL,
    bow INTEGER NOT NULL,
    crew TEXT NOT NULL,
    club TEXT NOT NULL,
    origin TEXT NOT NULL
)
";

/// Secondary index on timestamp for newest-first listing.
pub const CREATE_EVENTS_TS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_events_ts ON events(ts DESC)
";

/// Secondary index on action type for progress queries.
pub const CREATE_EVENTS_ACTION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_events_action ON events(action)
";

/// Secondary index on class name for per-class filtering.
pub const CREATE_EVENTS_CLASS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_events_class ON events(class_name)
";

/// SQL statement to create the dollies table.
pub const CREATE_DOLLIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS dollies (
    id TEXT PRIMARY KEY,
    class_name TEXT NOT NULL,
    bow INTEGER NOT NULL,
    dolly INTEGER NOT NULL,
    status TEXT NOT NULL,
    note TEXT,
    updated_at TEXT NOT NULL
)
";

/// Secondary index on class name for filtered listing.
pub const CREATE_DOLLIES_CLASS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_dollies_class ON dollies(class_name)
";

/// Secondary index on status for triage queries.
pub const CREATE_DOLLIES_STATUS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_dollies_status ON dollies(status)
";

/// SQL statement to create the meta table for storing key-value pairs.
pub const CREATE_META_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_ROSTER_TABLE,
    CREATE_ROSTER_SAIL_INDEX,
    CREATE_ROSTER_CLASS_INDEX,
    CREATE_EVENTS_TABLE,
    CREATE_EVENTS_TS_INDEX,
    CREATE_EVENTS_ACTION_INDEX,
    CREATE_EVENTS_CLASS_INDEX,
    CREATE_DOLLIES_TABLE,
    CREATE_DOLLIES_CLASS_INDEX,
    CREATE_DOLLIES_STATUS_INDEX,
    CREATE_META_TABLE,
];
