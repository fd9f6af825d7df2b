//! Database schema initialization.

use crate::error::{DatabaseResultExt, Result};

impl super::Database {
    /// Applies the embedded schema SQL, creating any missing objects.
    ///
    /// Safe to call on every startup: all DDL statements are idempotent.
    pub(super) fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn();

        // Enable foreign keys for this connection
        conn.execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to enable foreign keys")?;

        let schema_sql = include_str!("../../assets/schema.sql");
        conn.execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")?;

        log::debug!("database schema initialized");
        Ok(())
    }
}
