//! Catalog schema bootstrap.
//!
//! # Responsibility
//! - Create the `author` and `book` tables on an empty database.
//! - Refuse databases written by a newer schema.
//!
//! # Invariants
//! - Bootstrap runs inside an immediate transaction, so two connections
//!   racing on a fresh file create the tables once.

use crate::db::{DbError, DbResult};
use rusqlite::{Connection, TransactionBehavior};

const SCHEMA_VERSION: u32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Returns the schema version this binary writes and understands.
pub fn schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Creates the catalog tables when the database has no schema yet.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    if check_version(conn)? == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    // Another connection may have finished bootstrap while we waited.
    if check_version(&tx)? == 0 {
        tx.execute_batch(SCHEMA_SQL)?;
        tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    }
    tx.commit()?;

    Ok(())
}

fn check_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    if version > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: version,
            latest_supported: SCHEMA_VERSION,
        });
    }
    Ok(version)
}
