//! Schema creation and upgrade execution.
//!
//! # Responsibility
//! - Apply a [`SchemaConfig`] to a freshly opened connection.
//! - Decide between first-time creation and version upgrade from
//!   `PRAGMA user_version`.
//!
//! # Invariants
//! - `user_version` is 0 only for a database that was never created.
//! - Creation statements run in registration order; the configuration owns
//!   any ordering constraints between them.
//! - One lifecycle step runs inside one transaction: a failed upgrade leaves
//!   the previous schema version intact.

use crate::db::{DbResult, MigrationError};
use crate::schema::SchemaConfig;
use log::{info, warn};
use rusqlite::{Connection, Transaction};

/// Pluggable schema migration policy.
///
/// The shipped default is [`DestructiveMigration`]; alternative strategies
/// can preserve data without touching the open/init contract.
pub trait MigrationStrategy {
    /// Brings a never-created database up to the configured schema.
    fn on_create(&self, tx: &Transaction<'_>, config: &SchemaConfig) -> DbResult<()>;

    /// Moves an existing database from `old_version` to `new_version`.
    fn on_upgrade(
        &self,
        tx: &Transaction<'_>,
        config: &SchemaConfig,
        old_version: u32,
        new_version: u32,
    ) -> DbResult<()>;
}

/// Drop-and-recreate upgrade policy.
///
/// On any version bump every registered table is dropped by logical name and
/// recreated from its creation statement. All existing data is lost; this is
/// the documented default, not an accident.
#[derive(Debug, Clone, Copy, Default)]
pub struct DestructiveMigration;

impl MigrationStrategy for DestructiveMigration {
    fn on_create(&self, tx: &Transaction<'_>, config: &SchemaConfig) -> DbResult<()> {
        for table in config.tables() {
            tx.execute_batch(table.create_sql())?;
        }
        info!(
            "event=schema_create module=db status=ok database={} version={} tables={}",
            config.database_name(),
            config.database_version(),
            config.tables().len()
        );
        Ok(())
    }

    fn on_upgrade(
        &self,
        tx: &Transaction<'_>,
        config: &SchemaConfig,
        old_version: u32,
        new_version: u32,
    ) -> DbResult<()> {
        warn!(
            "event=schema_upgrade module=db status=start database={} old_version={old_version} new_version={new_version} note=destroys_all_existing_data",
            config.database_name()
        );
        for table in config.tables() {
            tx.execute_batch(&format!(
                "DROP TABLE IF EXISTS {};",
                table.logical_name()
            ))?;
        }
        self.on_create(tx, config)
    }
}

/// Runs the lifecycle step for `config` on an open connection.
///
/// No-op when the stored version already matches. A stored version newer
/// than the configured one is rejected; downgrades have no defined policy.
pub fn apply_schema(
    conn: &mut Connection,
    config: &SchemaConfig,
    strategy: &dyn MigrationStrategy,
) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let target_version = config.database_version();

    if current_version > target_version {
        return Err(MigrationError::UnsupportedDowngrade {
            db_version: current_version,
            configured_version: target_version,
        });
    }
    if current_version == target_version {
        return Ok(());
    }

    let tx = conn.transaction()?;
    if current_version == 0 {
        strategy.on_create(&tx, config)?;
    } else {
        strategy.on_upgrade(&tx, config, current_version, target_version)?;
    }
    tx.execute_batch(&format!("PRAGMA user_version = {target_version};"))?;
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
