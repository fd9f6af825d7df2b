//! High-level store API for the wardrobe catalog.
//!
//! This module provides the main [`WardrobeStore`] interface consumed by the
//! UI layer. The store coordinates two concerns:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   Item cache    │    │  Handle guard   │    │    Database     │
//! │ (optimistic     │───▶│ (lazy, opened   │───▶│   (via db/)     │
//! │  mutations)     │    │  exactly once)  │    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!   UI-facing state       Shared connection      Data persistence
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for creating [`WardrobeStore`] instances
//! - [`item_ops`]: Optimistic item operations (add, update, delete, clear,
//!   refresh)
//!
//! ## Optimistic protocol
//!
//! Every mutation applies a provisional change to the in-memory cache first,
//! then runs the durable write, then reconciles the cache with the canonical
//! row on success or rolls the provisional change back on failure. The cache
//! never holds a provisional entry once an operation has settled, and a
//! failed operation restores exactly the state the touched entry had before
//! it — concurrent operations on other items are never clobbered.
//!
//! The cache lock is only ever held for short synchronous sections, never
//! across an await point. Callers are expected to serialize mutations of the
//! same item id; independent items may be mutated concurrently.

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicI64, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

use tokio::{sync::OnceCell, task};

use crate::{db::Database, error::Result, models::Item};

pub mod builder;
pub mod item_ops;


pub use builder::StoreBuilder;

/// Main store interface: the single shared database handle plus the
/// in-memory list of live items the UI reads from.
pub struct WardrobeStore {
    db_path: PathBuf,
    handle: OnceCell<Database>,
    cache: Mutex<Vec<Item>>,
    next_provisional_id: AtomicI64,
}

impl WardrobeStore {
    /// Creates a store over the given database path. The file is not opened
    /// until the first operation or an explicit [`initialize`] call.
    ///
    /// [`initialize`]: WardrobeStore::initialize
    pub(crate) fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            handle: OnceCell::new(),
            cache: Mutex::new(Vec::new()),
            next_provisional_id: AtomicI64::new(-1),
        }
    }

    /// Resolves the shared database handle, opening the store file and
    /// applying the schema exactly once.
    ///
    /// Concurrent callers before the first successful open all share a
    /// single in-flight initialization. A failed attempt leaves the cell
    /// empty so the next call retries from scratch; the half-open
    /// connection was already dropped on the failure path.
    pub(crate) async fn handle(&self) -> Result<&Database> {
        self.handle
            .get_or_try_init(|| async {
                log::debug!("opening database at {}", self.db_path.display());
                let db_path = self.db_path.clone();
                task::spawn_blocking(move || Database::new(&db_path))
                    .await
                    .map_err(item_ops::join_error)?
            })
            .await
    }

    /// Returns a snapshot of the cached live items. Synchronous, no I/O.
    ///
    /// The snapshot is a clone; mutating it never affects the cache.
    pub fn cached_items(&self) -> Vec<Item> {
        self.cache_guard().clone()
    }

    /// Locks the cache, recovering from a poisoned lock. The cache is plain
    /// data, so the inner value stays valid after a panicked holder.
    pub(crate) fn cache_guard(&self) -> MutexGuard<'_, Vec<Item>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hands out the next synthetic id for a provisional cache entry.
    /// Provisional ids are negative and never collide with durable rows.
    pub(crate) fn next_provisional_id(&self) -> i64 {
        self.next_provisional_id.fetch_sub(1, Ordering::Relaxed)
    }
}
