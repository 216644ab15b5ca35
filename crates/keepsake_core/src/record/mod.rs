//! Record contract and shared persistence helpers.
//!
//! # Responsibility
//! - Define the capability interface every persisted record type implements.
//! - Provide the shared save/delete/count/compare logic over that interface.
//!
//! # Invariants
//! - `id == 0` means the record has no row yet (Transient).
//! - Deletion is represented by the soft-delete flag, never by removing the
//!   row.
//! - Ordering between records is descending by `modified`; an unparseable
//!   timestamp compares as equal and is never an error.

use crate::schema::SchemaConfig;
use crate::store::{row_get, RowValues, Store, StoreError, StoreResult};
use log::error;
use rusqlite::types::Value;
use std::cmp::Ordering;

pub mod time;

/// Identity column, assigned by the database on first insert.
pub const COLUMN_ID: &str = "_id";
/// Soft-delete flag column (0/1).
pub const COLUMN_DELETED: &str = "deleted";
/// Last-modification timestamp column.
pub const COLUMN_MODIFIED: &str = "modified";
/// Creation timestamp column.
pub const COLUMN_DATE: &str = "date";

/// The columns every managed table implicitly carries.
pub const BASE_COLUMNS: [&str; 4] = [COLUMN_ID, COLUMN_DELETED, COLUMN_MODIFIED, COLUMN_DATE];

/// Identity, soft-delete flag, and timestamps shared by every record.
///
/// Lifecycle: Transient (`id == 0`) -> Persisted (`id > 0`, not deleted) ->
/// SoftDeleted (`id > 0`, deleted). There is no automatic path back from
/// SoftDeleted; saving a record with the flag still set is the caller's
/// restore discipline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMeta {
    id: i64,
    deleted: bool,
    created: String,
    modified: String,
}

impl RecordMeta {
    /// Fresh transient metadata with both timestamps set to now.
    pub fn new() -> Self {
        let now = time::now_stamp();
        Self {
            id: 0,
            deleted: false,
            created: now.clone(),
            modified: now,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    /// True while the record has never been inserted.
    pub fn is_transient(&self) -> bool {
        self.id == 0
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    /// Creation timestamp in storage format.
    pub fn created(&self) -> &str {
        &self.created
    }

    pub fn set_created(&mut self, created: impl Into<String>) {
        self.created = created.into();
    }

    /// Last-modification timestamp in storage format.
    pub fn modified(&self) -> &str {
        &self.modified
    }

    pub fn set_modified(&mut self, modified: impl Into<String>) {
        self.modified = modified.into();
    }

    /// Creation timestamp re-formatted for display; empty on parse failure.
    pub fn created_display(&self) -> String {
        time::format_display(&self.created)
    }

    /// Modification timestamp re-formatted for display; empty on parse
    /// failure.
    pub fn modified_display(&self) -> String {
        time::format_display(&self.modified)
    }

    /// Serializes the implicit columns for a write payload.
    ///
    /// Excludes `_id`: identity is assigned by the database and addressed
    /// through the update/fetch filters instead.
    pub fn base_row(&self) -> RowValues {
        vec![
            (
                COLUMN_DELETED.to_string(),
                Value::Integer(i64::from(self.deleted)),
            ),
            (COLUMN_MODIFIED.to_string(), Value::Text(self.modified.clone())),
            (COLUMN_DATE.to_string(), Value::Text(self.created.clone())),
        ]
    }

    /// Rehydrates metadata from a fetched row.
    ///
    /// # Errors
    /// - `InvalidData` when an implicit column is missing or has an
    ///   unexpected type, including a `deleted` value other than 0/1.
    pub fn from_row(row: &[(String, Value)]) -> StoreResult<Self> {
        let id = match row_get(row, COLUMN_ID) {
            Some(Value::Integer(id)) => *id,
            other => return Err(invalid_column(COLUMN_ID, other)),
        };
        let deleted = match row_get(row, COLUMN_DELETED) {
            Some(Value::Integer(0)) => false,
            Some(Value::Integer(1)) => true,
            other => return Err(invalid_column(COLUMN_DELETED, other)),
        };
        let modified = match row_get(row, COLUMN_MODIFIED) {
            Some(Value::Text(text)) => text.clone(),
            other => return Err(invalid_column(COLUMN_MODIFIED, other)),
        };
        let created = match row_get(row, COLUMN_DATE) {
            Some(Value::Text(text)) => text.clone(),
            other => return Err(invalid_column(COLUMN_DATE, other)),
        };

        Ok(Self {
            id,
            deleted,
            created,
            modified,
        })
    }
}

impl Default for RecordMeta {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_column(column: &str, value: Option<&Value>) -> StoreError {
    StoreError::InvalidData(format!(
        "column `{column}` missing or has unexpected value {value:?}"
    ))
}

/// Capability interface for one persisted record type.
///
/// Implementations own their table name, serialized shape, and listing
/// logic; the shared lifecycle lives in the free-standing helpers below.
pub trait Record {
    /// Name of the table this record maps to.
    fn table_name(&self) -> &str;

    fn meta(&self) -> &RecordMeta;

    fn meta_mut(&mut self) -> &mut RecordMeta;

    /// Serializes every persisted field except `_id`.
    ///
    /// Must include the implicit columns (start from
    /// [`RecordMeta::base_row`]) plus the type's own fields.
    fn to_row(&self) -> RowValues;

    /// Ordered declared column list, `_id` first.
    fn columns(&self) -> Vec<&'static str>;

    /// The schema configuration this record's table is registered in.
    fn schema_config(&self) -> SchemaConfig;

    /// Loads every row of this type, soft-deleted ones included.
    ///
    /// Implementations typically call [`Store::fetch_all`] and rehydrate
    /// each row through their own field mapping.
    fn load_all(store: &Store) -> StoreResult<Vec<Self>>
    where
        Self: Sized;
}

/// Persists the record: insert when Transient, update when Persisted.
///
/// On insert the assigned identity is adopted into the record. On update the
/// `modified` timestamp is bumped first; if the update then affects no row,
/// the in-memory timestamp is rolled back before the error is returned, so
/// memory never disagrees with storage after a failed save.
pub fn save<R: Record + ?Sized>(store: &Store, record: &mut R) -> StoreResult<()> {
    if record.meta().is_transient() {
        let id = store.insert(record)?;
        record.meta_mut().set_id(id);
        return Ok(());
    }

    let previous = record.meta().modified().to_string();
    record.meta_mut().set_modified(time::now_stamp());
    match store.update(record) {
        Ok(()) => Ok(()),
        Err(err) => {
            record.meta_mut().set_modified(previous);
            Err(err)
        }
    }
}

/// Soft-deletes a persisted record.
///
/// The row stays in storage with its flag set; the in-memory flag is only
/// set once storage confirms the update.
///
/// # Errors
/// - `NotFound` with id 0 when the record is still Transient; nothing is
///   written.
pub fn delete<R: Record + ?Sized>(store: &Store, record: &mut R) -> StoreResult<()> {
    if record.meta().is_transient() {
        return Err(StoreError::NotFound {
            table: record.table_name().to_string(),
            id: 0,
        });
    }

    let previous = record.meta().modified().to_string();
    record.meta_mut().set_modified(time::now_stamp());
    match store.soft_delete(record) {
        Ok(()) => {
            record.meta_mut().set_deleted(true);
            Ok(())
        }
        Err(err) => {
            record.meta_mut().set_modified(previous);
            Err(err)
        }
    }
}

/// Number of rows of this record type, soft-deleted ones included.
///
/// A not-found signal from the underlying listing degrades to 0.
pub fn count<R: Record>(store: &Store) -> StoreResult<usize> {
    match R::load_all(store) {
        Ok(records) => Ok(records.len()),
        Err(StoreError::NotFound { .. }) => Ok(0),
        Err(err) => Err(err),
    }
}

/// Orders two records descending by `modified` (most recent first).
///
/// A parse failure on either timestamp is logged and yields `Equal`; sorting
/// never fails on dirty data.
pub fn cmp_by_modified<A, B>(a: &A, b: &B) -> Ordering
where
    A: Record + ?Sized,
    B: Record + ?Sized,
{
    let parsed_a = time::parse_stamp(a.meta().modified());
    let parsed_b = time::parse_stamp(b.meta().modified());
    match (parsed_a, parsed_b) {
        (Some(stamp_a), Some(stamp_b)) => stamp_b.cmp(&stamp_a),
        _ => {
            error!(
                "event=record_compare module=record status=error error_code=unparseable_modified left={} right={}",
                a.meta().modified(),
                b.meta().modified()
            );
            Ordering::Equal
        }
    }
}

/// Persists one many-to-many link between two saved records.
///
/// Returns the join row's identity. Convenience over
/// [`Store::insert_join_row`].
pub fn link<A, B>(store: &Store, join_table: &str, a: &A, b: &B) -> StoreResult<i64>
where
    A: Record + ?Sized,
    B: Record + ?Sized,
{
    store.insert_join_row(join_table, a, b)
}
