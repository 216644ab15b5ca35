//! Store: the owner of one open database handle.
//!
//! # Responsibility
//! - Own the open SQLite connection and its active schema configuration.
//! - Translate record payloads into parameterized insert/update/query calls.
//!
//! # Invariants
//! - One `Store` owns exactly one open connection; `close` consumes it.
//! - Write failures surface as typed errors, never as sentinel values.
//! - `fetch_all` does not filter soft-deleted rows; that is caller policy.

use crate::db::{open_database, DatabaseLocation, DestructiveMigration, MigrationError, MigrationStrategy};
use crate::record::{Record, COLUMN_DELETED, COLUMN_ID};
use crate::schema::SchemaConfig;
use log::info;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod global;

/// Ordered column-name/value pairs: the serialized shape of one table row.
///
/// Used both as the write payload produced by [`Record::to_row`] and as the
/// read result of `fetch_one`/`fetch_all`.
pub type RowValues = Vec<(String, Value)>;

/// Looks up a column value in a fetched row.
pub fn row_get<'a>(row: &'a [(String, Value)], column: &str) -> Option<&'a Value> {
    row.iter()
        .find(|(name, _)| name == column)
        .map(|(_, value)| value)
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Uniform failure taxonomy for store operations.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Migration(MigrationError),
    /// No row with this identity exists in the table.
    NotFound { table: String, id: i64 },
    /// The row exists but is soft-deleted.
    ///
    /// The core never raises this itself; it exists so callers can
    /// distinguish "physically absent" from "present but deleted" after
    /// checking the flag.
    Deleted { table: String, id: i64 },
    /// An insert reported no new row identity.
    WriteFailed { table: String },
    /// `init` was called with a configuration different from the one the
    /// open handle was created with.
    ConfigDrift { database: String },
    /// No open handle; `init` must be called (again).
    Closed,
    /// A fetched row cannot be rehydrated into a record.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Migration(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => {
                write!(f, "no row with id {id} found in table `{table}`")
            }
            Self::Deleted { table, id } => {
                write!(f, "row with id {id} in table `{table}` is soft-deleted")
            }
            Self::WriteFailed { table } => {
                write!(f, "insert into table `{table}` produced no row")
            }
            Self::ConfigDrift { database } => write!(
                f,
                "store already initialized with a different configuration than `{database}`"
            ),
            Self::Closed => write!(f, "store is not open; call init first"),
            Self::InvalidData(message) => write!(f, "invalid persisted row data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Migration(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<MigrationError> for StoreError {
    fn from(value: MigrationError) -> Self {
        Self::Migration(value)
    }
}

/// One open database handle plus the configuration it was opened with.
///
/// Constructed explicitly and passed by reference; the process-wide lookup
/// pattern lives in [`global`] for callers that want it.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
    config: SchemaConfig,
    location: DatabaseLocation,
}

impl Store {
    /// Opens a store with the default destructive migration policy.
    pub fn open(location: DatabaseLocation, config: SchemaConfig) -> StoreResult<Self> {
        Self::open_with(location, config, &DestructiveMigration)
    }

    /// Opens a store with an explicit migration strategy.
    ///
    /// Opening runs the schema create/upgrade lifecycle; any DDL failure is
    /// fatal and propagates here.
    pub fn open_with(
        location: DatabaseLocation,
        config: SchemaConfig,
        strategy: &dyn MigrationStrategy,
    ) -> StoreResult<Self> {
        let conn = open_database(&location, &config, strategy)?;
        Ok(Self {
            conn,
            config,
            location,
        })
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    pub fn location(&self) -> &DatabaseLocation {
        &self.location
    }

    /// Inserts the record's serialized row and returns the new identity.
    pub fn insert<R: Record + ?Sized>(&self, record: &R) -> StoreResult<i64> {
        self.insert_row(record.table_name(), record.to_row())
    }

    /// Updates the row whose `_id` matches the record's identity.
    ///
    /// # Errors
    /// - `NotFound` when no row was affected.
    pub fn update<R: Record + ?Sized>(&self, record: &R) -> StoreResult<()> {
        self.update_row(record.table_name(), record.meta().id(), record.to_row())
    }

    /// Updates the record's row with the deleted flag forced on.
    ///
    /// The row stays physically present; this is the only delete the store
    /// offers.
    pub fn soft_delete<R: Record + ?Sized>(&self, record: &R) -> StoreResult<()> {
        let mut payload = record.to_row();
        match payload
            .iter_mut()
            .find(|(name, _)| name == COLUMN_DELETED)
        {
            Some((_, value)) => *value = Value::Integer(1),
            None => payload.push((COLUMN_DELETED.to_string(), Value::Integer(1))),
        }
        self.update_row(record.table_name(), record.meta().id(), payload)
    }

    /// Fetches the record's row by identity; `None` when physically absent.
    ///
    /// Soft-deleted rows are returned like any other row.
    pub fn fetch_one<R: Record + ?Sized>(&self, record: &R) -> StoreResult<Option<RowValues>> {
        let columns = record.columns();
        let sql = format!(
            "SELECT {} FROM {} WHERE {COLUMN_ID} = ?1;",
            columns.join(", "),
            record.table_name()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([record.meta().id()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(read_row(&columns, row)?));
        }
        Ok(None)
    }

    /// Fetches every row of the record's table, soft-deleted ones included.
    pub fn fetch_all<R: Record + ?Sized>(&self, record: &R) -> StoreResult<Vec<RowValues>> {
        let columns = record.columns();
        let sql = format!(
            "SELECT {} FROM {};",
            columns.join(", "),
            record.table_name()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(read_row(&columns, row)?);
        }
        Ok(result)
    }

    /// Inserts one many-to-many join row linking `a` and `b`.
    ///
    /// The join table carries exactly two columns, `{a.table}_id` and
    /// `{b.table}_id`. No uniqueness is enforced; repeating the call creates
    /// a second independent row.
    pub fn insert_join_row<A, B>(&self, join_table: &str, a: &A, b: &B) -> StoreResult<i64>
    where
        A: Record + ?Sized,
        B: Record + ?Sized,
    {
        let payload = vec![
            (
                format!("{}_id", a.table_name()),
                Value::Integer(a.meta().id()),
            ),
            (
                format!("{}_id", b.table_name()),
                Value::Integer(b.meta().id()),
            ),
        ];
        self.insert_row(join_table, payload)
    }

    /// Closes the handle. Operations through [`global`] fail with `Closed`
    /// until a new `init`.
    pub fn close(self) -> StoreResult<()> {
        let database = self.config.database_name().to_string();
        self.conn
            .close()
            .map_err(|(_conn, err)| StoreError::Sqlite(err))?;
        info!("event=db_close module=store status=ok database={database}");
        Ok(())
    }

    fn insert_row(&self, table: &str, payload: RowValues) -> StoreResult<i64> {
        let columns: Vec<&str> = payload.iter().map(|(name, _)| name.as_str()).collect();
        let placeholders: Vec<String> = (1..=payload.len()).map(|n| format!("?{n}")).collect();
        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({});",
            columns.join(", "),
            placeholders.join(", ")
        );

        self.conn.execute(
            &sql,
            params_from_iter(payload.iter().map(|(_, value)| value)),
        )?;

        let id = self.conn.last_insert_rowid();
        if id <= 0 {
            return Err(StoreError::WriteFailed {
                table: table.to_string(),
            });
        }
        Ok(id)
    }

    fn update_row(&self, table: &str, id: i64, payload: RowValues) -> StoreResult<()> {
        let assignments: Vec<String> = payload
            .iter()
            .enumerate()
            .map(|(index, (name, _))| format!("{name} = ?{}", index + 1))
            .collect();
        let sql = format!(
            "UPDATE {table} SET {} WHERE {COLUMN_ID} = ?{};",
            assignments.join(", "),
            payload.len() + 1
        );

        let mut values: Vec<Value> = payload.into_iter().map(|(_, value)| value).collect();
        values.push(Value::Integer(id));

        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                table: table.to_string(),
                id,
            });
        }
        Ok(())
    }
}

fn read_row(columns: &[&'static str], row: &rusqlite::Row<'_>) -> StoreResult<RowValues> {
    let mut values = Vec::with_capacity(columns.len());
    for (index, column) in columns.iter().enumerate() {
        values.push((column.to_string(), row.get::<_, Value>(index)?));
    }
    Ok(values)
}
