//! Database migrations

use rusqlite::Connection;

use crate::error::{DirError, Result};

const MIGRATIONS: [&str; 1] = [include_str!("../../migrations/001_initial_schema.sql")];

#[allow(clippy::cast_possible_truncation)]
pub const SCHEMA_VERSION: u32 = MIGRATIONS.len() as u32;

/// Bring the schema up to [`SCHEMA_VERSION`], skipping applied steps.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    let current_version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(|err| DirError::Migration(err.to_string()))?;

    if current_version > SCHEMA_VERSION {
        return Err(DirError::Migration(format!(
            "database schema version {current_version} is newer than supported version {SCHEMA_VERSION}"
        )));
    }

    for (idx, sql) in MIGRATIONS.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let target_version = (idx + 1) as u32;
        if current_version >= target_version {
            continue;
        }

        conn.execute_batch(sql)
            .map_err(|err| DirError::Migration(format!("migration {target_version} failed: {err}")))?;
        conn.pragma_update(None, "user_version", target_version)
            .map_err(|err| {
                DirError::Migration(format!("failed to set user_version {target_version}: {err}"))
            })?;
        tracing::debug!(version = target_version, "applied migration");
    }

    Ok(SCHEMA_VERSION)
}
