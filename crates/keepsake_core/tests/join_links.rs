mod common;

use common::{schema_at_version, Note, Tag};
use keepsake_core::{
    link, row_get, save, DatabaseLocation, Record, RecordMeta, RowValues, SchemaConfig, Store,
    StoreResult, COLUMN_ID,
};
use rusqlite::types::Value;

/// Read-only view over the `note_tags` join table.
struct NoteTagLink {
    meta: RecordMeta,
}

impl NoteTagLink {
    fn probe() -> Self {
        Self {
            meta: RecordMeta::new(),
        }
    }
}

impl Record for NoteTagLink {
    fn table_name(&self) -> &str {
        "note_tags"
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn to_row(&self) -> RowValues {
        Vec::new()
    }

    fn columns(&self) -> Vec<&'static str> {
        vec![COLUMN_ID, "notes_id", "tags_id"]
    }

    fn schema_config(&self) -> SchemaConfig {
        schema_at_version(1)
    }

    fn load_all(_store: &Store) -> StoreResult<Vec<Self>> {
        unimplemented!("join rows are inspected through fetch_all in these tests")
    }
}

#[test]
fn join_row_carries_both_foreign_key_columns() {
    let store = Store::open(DatabaseLocation::InMemory, schema_at_version(1)).unwrap();

    let mut note = Note::new("tagged");
    let mut tag = Tag::new("inbox");
    save(&store, &mut note).unwrap();
    save(&store, &mut tag).unwrap();

    let link_id = link(&store, "note_tags", &note, &tag).unwrap();
    assert!(link_id > 0);

    let rows = store.fetch_all(&NoteTagLink::probe()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        row_get(&rows[0], "notes_id"),
        Some(&Value::Integer(note.meta().id()))
    );
    assert_eq!(
        row_get(&rows[0], "tags_id"),
        Some(&Value::Integer(tag.meta().id()))
    );
}

#[test]
fn repeated_link_creates_an_independent_row() {
    let store = Store::open(DatabaseLocation::InMemory, schema_at_version(1)).unwrap();

    let mut note = Note::new("tagged twice");
    let mut tag = Tag::new("favorites");
    save(&store, &mut note).unwrap();
    save(&store, &mut tag).unwrap();

    let first = link(&store, "note_tags", &note, &tag).unwrap();
    let second = link(&store, "note_tags", &note, &tag).unwrap();
    assert_ne!(first, second, "no uniqueness is enforced on link pairs");

    let rows = store.fetch_all(&NoteTagLink::probe()).unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn link_order_decides_column_assignment() {
    let store = Store::open(DatabaseLocation::InMemory, schema_at_version(1)).unwrap();

    let mut note = Note::new("left or right");
    let mut tag = Tag::new("order");
    save(&store, &mut note).unwrap();
    save(&store, &mut tag).unwrap();

    // Columns are named after each record's own table, so argument order
    // does not change where an id lands.
    link(&store, "note_tags", &tag, &note).unwrap();

    let rows = store.fetch_all(&NoteTagLink::probe()).unwrap();
    assert_eq!(
        row_get(&rows[0], "notes_id"),
        Some(&Value::Integer(note.meta().id()))
    );
    assert_eq!(
        row_get(&rows[0], "tags_id"),
        Some(&Value::Integer(tag.meta().id()))
    );
}
