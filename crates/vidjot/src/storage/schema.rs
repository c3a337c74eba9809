//! DDL for the ideas database.
//!
//! Every statement is `IF NOT EXISTS`, so the whole set can be replayed on
//! each open.

/// One row per idea. `date` is RFC 3339 UTC with fixed precision, so text
/// order is time order.
pub const IDEAS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS ideas (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    details TEXT NOT NULL,
    date TEXT NOT NULL
)
";

/// Backs the newest-first listing.
pub const IDEAS_BY_DATE: &str = r"
CREATE INDEX IF NOT EXISTS idx_ideas_date ON ideas(date DESC)
";

/// Key/value pairs about the database itself, e.g. the schema version.
pub const METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Replayed in this order on every open.
pub const BASE_SCHEMA: &[&str] = &[IDEAS_TABLE, IDEAS_BY_DATE, METADATA_TABLE];
