//! スキーマのマイグレーション
//!
//! Each step is a SQL script tagged with the schema version it produces.
//! The version a database is at lives in `PRAGMA user_version`; pending steps
//! run inside one transaction, so a failing script leaves the file at its
//! previous version.

use rusqlite::{Connection, Transaction};

use super::{DbError, DbResult};

/// (schema version, script) in ascending version order.
const STEPS: &[(u32, &str)] = &[(1, include_str!("0001_init.sql"))];

pub fn target_version() -> u32 {
    STEPS.last().map_or(0, |&(version, _)| version)
}

pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Bring `conn` up to `target_version()`. Returns the number of steps applied.
pub fn migrate(conn: &mut Connection) -> DbResult<usize> {
    let from = schema_version(conn)?;
    let target = target_version();
    if from > target {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: target,
        });
    }

    let pending: Vec<_> = STEPS.iter().filter(|&&(version, _)| version > from).collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for &&(version, script) in &pending {
        run_step(&tx, version, script)?;
    }
    tx.commit()?;
    Ok(pending.len())
}

fn run_step(tx: &Transaction<'_>, version: u32, script: &str) -> DbResult<()> {
    tx.execute_batch(script)?;
    tx.pragma_update(None, "user_version", version)?;
    Ok(())
}
