//! Guarded process-wide store.
//!
//! # Responsibility
//! - Hold at most one open [`Store`] for callers that want global lookup
//!   instead of passing a store reference around.
//!
//! # Invariants
//! - Construction and handle-open are serialized behind one mutex;
//!   concurrent first-time `init` calls cannot race into duplicate handles.
//! - `init` while open is a no-op only for an equal configuration and
//!   location; any drift is rejected, never silently ignored.

use super::{Store, StoreError, StoreResult};
use crate::db::DatabaseLocation;
use crate::schema::SchemaConfig;
use log::info;
use once_cell::sync::OnceCell;
use std::sync::{Mutex, MutexGuard};

static GLOBAL_STORE: OnceCell<Mutex<Option<Store>>> = OnceCell::new();

fn slot() -> MutexGuard<'static, Option<Store>> {
    GLOBAL_STORE
        .get_or_init(|| Mutex::new(None))
        .lock()
        // A poisoned slot only means another thread panicked mid-operation;
        // the Option inside is still structurally valid.
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Opens the global store, or verifies it against an already-open one.
///
/// Idempotent: calling again while open with an equal location and
/// configuration does nothing and keeps the existing handle. After
/// [`close`], `init` opens a fresh handle.
///
/// # Errors
/// - `ConfigDrift` when a store is open with a different configuration or
///   location.
/// - Migration and open failures from [`Store::open`].
pub fn init(location: DatabaseLocation, config: SchemaConfig) -> StoreResult<()> {
    let mut guard = slot();

    if let Some(open) = guard.as_ref() {
        if open.config() == &config && open.location() == &location {
            info!(
                "event=store_init module=store status=noop database={}",
                config.database_name()
            );
            return Ok(());
        }
        return Err(StoreError::ConfigDrift {
            database: config.database_name().to_string(),
        });
    }

    let store = Store::open(location, config)?;
    info!(
        "event=store_init module=store status=ok database={}",
        store.config().database_name()
    );
    *guard = Some(store);
    Ok(())
}

/// Runs `op` against the open global store.
///
/// # Errors
/// - `Closed` when no store is open.
pub fn with<T>(op: impl FnOnce(&Store) -> StoreResult<T>) -> StoreResult<T> {
    let guard = slot();
    match guard.as_ref() {
        Some(store) => op(store),
        None => Err(StoreError::Closed),
    }
}

/// Closes the global store; later operations fail until re-`init`.
///
/// # Errors
/// - `Closed` when no store is open.
pub fn close() -> StoreResult<()> {
    let mut guard = slot();
    match guard.take() {
        Some(store) => store.close(),
        None => Err(StoreError::Closed),
    }
}

/// Reports whether a global store is currently open.
pub fn is_open() -> bool {
    slot().is_some()
}
