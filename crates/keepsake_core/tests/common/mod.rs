//! Shared fixtures: a minimal notes/tags schema and two record types.

#![allow(dead_code)]

use keepsake_core::{
    row_get, Record, RecordMeta, RowValues, SchemaConfig, Store, StoreError, StoreResult,
    COLUMN_DATE, COLUMN_DELETED, COLUMN_ID, COLUMN_MODIFIED,
};
use rusqlite::types::Value;

pub const CREATE_NOTES: &str = "CREATE TABLE notes (
    _id INTEGER PRIMARY KEY AUTOINCREMENT,
    deleted INTEGER NOT NULL DEFAULT 0,
    modified TEXT NOT NULL,
    date TEXT NOT NULL,
    text TEXT NOT NULL
);";

pub const CREATE_TAGS: &str = "CREATE TABLE tags (
    _id INTEGER PRIMARY KEY AUTOINCREMENT,
    deleted INTEGER NOT NULL DEFAULT 0,
    modified TEXT NOT NULL,
    date TEXT NOT NULL,
    name TEXT NOT NULL
);";

pub const CREATE_NOTE_TAGS: &str = "CREATE TABLE note_tags (
    _id INTEGER PRIMARY KEY AUTOINCREMENT,
    notes_id INTEGER NOT NULL,
    tags_id INTEGER NOT NULL
);";

pub fn schema_at_version(version: u32) -> SchemaConfig {
    SchemaConfig::builder("keepsake-test.db", version)
        .table("TABLE_NOTES", CREATE_NOTES)
        .table("TABLE_TAGS", CREATE_TAGS)
        .table("TABLE_NOTE_TAGS", CREATE_NOTE_TAGS)
        .build()
        .expect("test schema must build")
}

pub struct Note {
    pub meta: RecordMeta,
    pub text: String,
}

impl Note {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            meta: RecordMeta::new(),
            text: text.into(),
        }
    }

    fn from_row(row: &RowValues) -> StoreResult<Self> {
        let meta = RecordMeta::from_row(row)?;
        let text = match row_get(row, "text") {
            Some(Value::Text(text)) => text.clone(),
            other => {
                return Err(StoreError::InvalidData(format!(
                    "column `text` missing or has unexpected value {other:?}"
                )))
            }
        };
        Ok(Self { meta, text })
    }
}

impl Record for Note {
    fn table_name(&self) -> &str {
        "notes"
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn to_row(&self) -> RowValues {
        let mut row = self.meta.base_row();
        row.push(("text".to_string(), Value::Text(self.text.clone())));
        row
    }

    fn columns(&self) -> Vec<&'static str> {
        vec![COLUMN_ID, COLUMN_DELETED, COLUMN_MODIFIED, COLUMN_DATE, "text"]
    }

    fn schema_config(&self) -> SchemaConfig {
        schema_at_version(1)
    }

    fn load_all(store: &Store) -> StoreResult<Vec<Self>> {
        let probe = Note::new("");
        store
            .fetch_all(&probe)?
            .iter()
            .map(Note::from_row)
            .collect()
    }
}

pub struct Tag {
    pub meta: RecordMeta,
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: RecordMeta::new(),
            name: name.into(),
        }
    }
}

impl Record for Tag {
    fn table_name(&self) -> &str {
        "tags"
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn to_row(&self) -> RowValues {
        let mut row = self.meta.base_row();
        row.push(("name".to_string(), Value::Text(self.name.clone())));
        row
    }

    fn columns(&self) -> Vec<&'static str> {
        vec![COLUMN_ID, COLUMN_DELETED, COLUMN_MODIFIED, COLUMN_DATE, "name"]
    }

    fn schema_config(&self) -> SchemaConfig {
        schema_at_version(1)
    }

    fn load_all(store: &Store) -> StoreResult<Vec<Self>> {
        let probe = Tag::new("");
        store
            .fetch_all(&probe)?
            .iter()
            .map(|row| {
                let meta = RecordMeta::from_row(row)?;
                let name = match row_get(row, "name") {
                    Some(Value::Text(name)) => name.clone(),
                    other => {
                        return Err(StoreError::InvalidData(format!(
                            "column `name` missing or has unexpected value {other:?}"
                        )))
                    }
                };
                Ok(Self { meta, name })
            })
            .collect()
    }
}
