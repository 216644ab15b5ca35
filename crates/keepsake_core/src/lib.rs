//! Minimal soft-delete persistence core over embedded SQLite.
//! One schema configuration per database, one open handle per store,
//! records that are marked deleted instead of removed.

pub mod db;
pub mod logging;
pub mod record;
pub mod schema;
pub mod store;

pub use db::{DatabaseLocation, DestructiveMigration, MigrationError, MigrationStrategy};
pub use logging::{default_log_level, init_logging, logging_status};
pub use record::{
    cmp_by_modified, count, delete, link, save, Record, RecordMeta, BASE_COLUMNS, COLUMN_DATE,
    COLUMN_DELETED, COLUMN_ID, COLUMN_MODIFIED,
};
pub use schema::{SchemaBuilder, SchemaConfig, SchemaError, TableDef};
pub use store::{row_get, RowValues, Store, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
