//! Database operations and SQLite management for the wardrobe catalog.
//!
//! This module provides the low-level record repository. It owns the shared
//! SQLite connection, applies the schema, and implements the atomic
//! multi-table operations over items, metadata, tags, tag links, and images.
//! Higher layers never touch the connection directly.

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod item_queries;
pub mod row;
pub mod schema;
pub mod tag_queries;

/// Database connection and operations handler.
///
/// Clones share the single underlying connection; the store layer opens one
/// `Database` per process and hands clones to blocking tasks. All
/// multi-statement operations run inside one SQLite transaction.
#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens the database file and initializes the schema.
    ///
    /// If schema initialization fails the freshly opened connection is
    /// dropped, which closes it; no half-initialized handle escapes.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection =
            Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self {
            connection: Arc::new(Mutex::new(connection)),
        };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Locks the shared connection.
    ///
    /// A poisoned lock is recovered by taking the inner value: the
    /// connection itself stays usable after a panicked holder, and SQLite
    /// transactions guard data consistency.
    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
