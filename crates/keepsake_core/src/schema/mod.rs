//! Database schema configuration and table registration.
//!
//! # Responsibility
//! - Describe one database: its name, version, and table creation statements.
//! - Normalize declared table names into logical names by convention.
//!
//! # Invariants
//! - A built `SchemaConfig` is immutable.
//! - Logical table names are unique within one configuration.
//! - Creation statements are opaque strings owned by the configuration; the
//!   core never parses them.

use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Marker prefix that identifies a declared member as a table declaration.
///
/// A declared name `TABLE_NOTES` registers the logical table `notes`.
pub const TABLE_MARKER: &str = "TABLE_";

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Debug, PartialEq, Eq)]
pub enum SchemaError {
    EmptyDatabaseName,
    /// Versions start at 1; version 0 is reserved for "never created".
    InvalidVersion(u32),
    DuplicateTable(String),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDatabaseName => write!(f, "database name cannot be empty"),
            Self::InvalidVersion(version) => {
                write!(f, "database version must be >= 1, got {version}")
            }
            Self::DuplicateTable(name) => {
                write!(f, "logical table name `{name}` registered twice")
            }
        }
    }
}

impl Error for SchemaError {}

/// One registered table: its normalized logical name and creation DDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    logical_name: String,
    create_sql: String,
}

impl TableDef {
    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    pub fn create_sql(&self) -> &str {
        &self.create_sql
    }
}

/// Immutable description of one database schema version.
///
/// Constructed once per database version through [`SchemaBuilder`]; read by
/// the migration layer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConfig {
    database_name: String,
    database_version: u32,
    tables: Vec<TableDef>,
}

impl SchemaConfig {
    /// Starts a builder for a schema with the given name and version.
    pub fn builder(database_name: impl Into<String>, database_version: u32) -> SchemaBuilder {
        SchemaBuilder {
            database_name: database_name.into(),
            database_version,
            tables: Vec::new(),
        }
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn database_version(&self) -> u32 {
        self.database_version
    }

    /// Registered tables in registration order.
    ///
    /// The core executes creation statements in exactly this order; a
    /// configuration with dependencies between statements must order them
    /// itself.
    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }
}

/// Explicit table registration, replacing convention scanning over declared
/// constants.
///
/// Declared names keep the original convention: they must carry the
/// [`TABLE_MARKER`] prefix, and the logical name is the remainder lowercased.
/// A declared name without the marker is logged and skipped so that a partial
/// registration never aborts the whole configuration.
#[derive(Debug)]
pub struct SchemaBuilder {
    database_name: String,
    database_version: u32,
    tables: Vec<TableDef>,
}

impl SchemaBuilder {
    /// Registers one table declaration.
    ///
    /// `declared_name` must be prefixed with [`TABLE_MARKER`]; otherwise the
    /// entry is skipped with a log line and the builder continues.
    pub fn table(mut self, declared_name: &str, create_sql: impl Into<String>) -> Self {
        match logical_name(declared_name) {
            Some(name) => {
                self.tables.push(TableDef {
                    logical_name: name,
                    create_sql: create_sql.into(),
                });
            }
            None => {
                warn!(
                    "event=schema_register module=schema status=skipped declared_name={declared_name} reason=missing_marker"
                );
            }
        }
        self
    }

    /// Finalizes the configuration.
    ///
    /// # Errors
    /// - `EmptyDatabaseName` when the database name is blank.
    /// - `InvalidVersion` when the version is 0.
    /// - `DuplicateTable` when two declarations normalize to the same
    ///   logical name.
    pub fn build(self) -> SchemaResult<SchemaConfig> {
        if self.database_name.trim().is_empty() {
            return Err(SchemaError::EmptyDatabaseName);
        }
        if self.database_version == 0 {
            return Err(SchemaError::InvalidVersion(self.database_version));
        }
        for (index, table) in self.tables.iter().enumerate() {
            let duplicated = self.tables[..index]
                .iter()
                .any(|earlier| earlier.logical_name == table.logical_name);
            if duplicated {
                return Err(SchemaError::DuplicateTable(table.logical_name.clone()));
            }
        }

        Ok(SchemaConfig {
            database_name: self.database_name,
            database_version: self.database_version,
            tables: self.tables,
        })
    }
}

/// Derives a logical table name from a declared constant-style name.
///
/// Returns `None` when the declared name does not carry [`TABLE_MARKER`].
fn logical_name(declared_name: &str) -> Option<String> {
    declared_name
        .strip_prefix(TABLE_MARKER)
        .filter(|rest| !rest.is_empty())
        .map(str::to_lowercase)
}
