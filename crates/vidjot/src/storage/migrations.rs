//! Schema versioning for the ideas database.
//!
//! The base tables are replayed from [`BASE_SCHEMA`] on every open; the
//! version recorded in `metadata` then decides which upgrade steps still run.

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::error::{Error, Result};

use super::schema::BASE_SCHEMA;

const VERSION_KEY: &str = "schema_version";

/// An upgrade step. Index `n` in [`MIGRATIONS`] moves the schema to `n + 1`.
type Migration = fn(&Connection) -> Result<()>;

/// Ordered upgrade steps.
const MIGRATIONS: &[Migration] = &[baseline];

/// The schema version this build writes.
pub const CURRENT_VERSION: i32 = 1;

/// Create the base schema and bring it up to [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns an error if a statement fails, if the stored version is not a
/// number, or if the database was written by a newer build.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for ddl in BASE_SCHEMA {
        conn.execute(ddl, [])?;
    }

    let found = schema_version(conn)?;
    if found > CURRENT_VERSION {
        return Err(Error::Schema {
            message: format!(
                "database schema version {found} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    ((found + 1)..=CURRENT_VERSION).try_for_each(|target| apply(conn, target))
}

/// Stored schema version; 0 when none has been recorded yet.
fn schema_version(conn: &Connection) -> Result<i32> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    stored.map_or(Ok(0), |raw| {
        raw.parse().map_err(|_| Error::Schema {
            message: format!("invalid schema version: {raw}"),
        })
    })
}

fn record_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT INTO metadata (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

/// Run the step that produces `target` and record it, atomically.
fn apply(conn: &Connection, target: i32) -> Result<()> {
    let step = usize::try_from(target - 1)
        .ok()
        .and_then(|index| MIGRATIONS.get(index))
        .ok_or_else(|| Error::Schema {
            message: format!("unknown migration version: {target}"),
        })?;

    let tx = conn.unchecked_transaction()?;
    step(&tx)?;
    record_version(&tx, target)?;
    tx.commit()?;

    info!("Migrated ideas database to schema version {}", target);
    Ok(())
}

/// Version 1 is the base schema itself.
fn baseline(_conn: &Connection) -> Result<()> {
    Ok(())
}
