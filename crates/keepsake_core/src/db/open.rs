//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Run the schema lifecycle step before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections carry the configured schema version.

use super::lifecycle::apply_schema;
use super::{DbResult, MigrationStrategy};
use crate::schema::SchemaConfig;
use log::{error, info};
use rusqlite::Connection;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Where the database lives.
///
/// Replaces the host-application context of the original design: the only
/// thing the core ever needed from it was a storage location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// A database file; the configured database name is the file name when
    /// the path points at a directory.
    OnDisk(PathBuf),
    /// Private in-memory database, mainly for tests.
    InMemory,
}

impl DatabaseLocation {
    fn mode(&self) -> &'static str {
        match self {
            Self::OnDisk(_) => "file",
            Self::InMemory => "memory",
        }
    }
}

/// Opens a SQLite database and brings its schema up to the configured
/// version.
///
/// # Side effects
/// - Performs connection bootstrap and the create/upgrade lifecycle step.
/// - Emits `db_open` logging events with duration and status.
pub fn open_database(
    location: &DatabaseLocation,
    config: &SchemaConfig,
    strategy: &dyn MigrationStrategy,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = location.mode();
    info!(
        "event=db_open module=db status=start mode={mode} database={}",
        config.database_name()
    );

    let opened = match location {
        DatabaseLocation::OnDisk(path) => {
            let file = if path.is_dir() {
                path.join(config.database_name())
            } else {
                path.clone()
            };
            Connection::open(file)
        }
        DatabaseLocation::InMemory => Connection::open_in_memory(),
    };

    let mut conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, config, strategy) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(
    conn: &mut Connection,
    config: &SchemaConfig,
    strategy: &dyn MigrationStrategy,
) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_schema(conn, config, strategy)?;
    Ok(())
}
