//! SQLite storage bootstrap and schema lifecycle entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for keepsake stores.
//! - Drive schema creation and version upgrades from a [`SchemaConfig`].
//!
//! # Invariants
//! - The applied schema version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write table data before the lifecycle step
//!   succeeds.
//!
//! [`SchemaConfig`]: crate::schema::SchemaConfig

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod lifecycle;
mod open;

pub use lifecycle::{DestructiveMigration, MigrationStrategy};
pub use open::{open_database, DatabaseLocation};

pub type DbResult<T> = Result<T, MigrationError>;

/// Fatal failures while creating or upgrading a schema.
///
/// Any variant propagates out of the open/init call unchanged; there is no
/// retry or partial-recovery path.
#[derive(Debug)]
pub enum MigrationError {
    Sqlite(rusqlite::Error),
    /// The stored schema version is newer than the configured one.
    UnsupportedDowngrade {
        db_version: u32,
        configured_version: u32,
    },
}

impl Display for MigrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedDowngrade {
                db_version,
                configured_version,
            } => write!(
                f,
                "stored schema version {db_version} is newer than configured {configured_version}"
            ),
        }
    }
}

impl Error for MigrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedDowngrade { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for MigrationError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
