//! Single-table schema creation and destructive upgrade.
//!
//! # Responsibility
//! - Create the `records` table on a fresh database.
//! - Drop and recreate it when the requested version is higher than the
//!   persisted one.
//!
//! # Invariants
//! - Upgrades destroy all rows; there is no in-place migration.
//! - Applied version is mirrored to `PRAGMA user_version` in the same
//!   transaction as the DDL.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;

const CREATE_RECORDS_SQL: &str = "CREATE TABLE records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    body TEXT,
    createdAt INTEGER,
    modifiedAt INTEGER
);";

const DROP_RECORDS_SQL: &str = "DROP TABLE IF EXISTS records;";

/// What `ensure_schema` did to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaAction {
    /// Fresh database, table created.
    Created,
    /// Older version found, table dropped and recreated empty.
    Recreated { from: u32 },
    /// Version already current, nothing touched.
    Unchanged,
}

/// Brings the schema to `version`.
///
/// # Errors
/// - `InvalidSchemaVersion` when `version` is 0.
/// - `UnsupportedSchemaVersion` when the database is newer than `version`.
/// - `Sqlite` for any DDL failure; the transaction is rolled back.
pub fn ensure_schema(conn: &mut Connection, version: u32) -> DbResult<SchemaAction> {
    if version == 0 {
        return Err(DbError::InvalidSchemaVersion(version));
    }

    let current = current_user_version(conn)?;
    if current > version {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            requested: version,
        });
    }
    if current == version {
        return Ok(SchemaAction::Unchanged);
    }

    let tx = conn.transaction()?;
    let action = if current == 0 {
        tx.execute_batch(DROP_RECORDS_SQL)?;
        tx.execute_batch(CREATE_RECORDS_SQL)?;
        info!("event=schema_create module=db status=ok version={version}");
        SchemaAction::Created
    } else {
        warn!(
            "event=schema_upgrade module=db status=start from={current} to={version} detail=destroying_all_records"
        );
        tx.execute_batch(DROP_RECORDS_SQL)?;
        tx.execute_batch(CREATE_RECORDS_SQL)?;
        info!("event=schema_upgrade module=db status=ok from={current} to={version}");
        SchemaAction::Recreated { from: current }
    };
    tx.execute_batch(&format!("PRAGMA user_version = {version};"))?;
    tx.commit()?;

    Ok(action)
}

/// Reads the persisted schema version; 0 means never initialized.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
