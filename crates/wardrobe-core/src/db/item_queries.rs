//! Item CRUD operations and queries.

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension};

use crate::{
    error::{DatabaseResultExt, Result, StoreError},
    models::Item,
    params::{NewItemData, UpdateItemData},
};

// Optimized SQL queries as const strings for compile-time optimization
const INSERT_ITEM_SQL: &str = "INSERT INTO items (name, description, category, created_at, updated_at, pending_sync) VALUES (?1, ?2, ?3, ?4, ?5, 1)";
const INSERT_METADATA_SQL: &str = "INSERT INTO metadata (item_id, attributes, created_at, updated_at, pending_sync) VALUES (?1, ?2, ?3, ?4, 1)";
const SELECT_LIVE_METADATA_ID_SQL: &str =
    "SELECT id FROM metadata WHERE item_id = ?1 AND deleted = 0 ORDER BY id LIMIT 1";
const UPDATE_METADATA_SQL: &str =
    "UPDATE metadata SET attributes = ?1, updated_at = ?2, pending_sync = 1, deleted = 0 WHERE id = ?3";
const RETIRE_SURPLUS_METADATA_SQL: &str = "UPDATE metadata SET deleted = 1, pending_sync = 1, updated_at = ?1 WHERE item_id = ?2 AND deleted = 0 AND id <> ?3";
const UPDATE_ITEM_SQL: &str = "UPDATE items SET name = ?1, description = ?2, category = ?3, updated_at = ?4, pending_sync = 1 WHERE id = ?5 AND deleted = 0";
const SOFT_DELETE_ITEM_SQL: &str =
    "UPDATE items SET deleted = 1, pending_sync = 1, updated_at = ?1 WHERE id = ?2 AND deleted = 0";
const SOFT_DELETE_ITEM_METADATA_SQL: &str = "UPDATE metadata SET deleted = 1, pending_sync = 1, updated_at = ?1 WHERE item_id = ?2 AND deleted = 0";
const SOFT_DELETE_ITEM_IMAGES_SQL: &str = "UPDATE item_images SET deleted = 1, pending_sync = 1, updated_at = ?1 WHERE item_id = ?2 AND deleted = 0";
const SELECT_ITEM_SQL: &str = "SELECT id, user_id, name, description, category, created_at, updated_at, pending_sync, deleted, metadata, tags, images FROM item_details WHERE id = ?1";
const SELECT_ITEMS_SQL: &str = "SELECT id, user_id, name, description, category, created_at, updated_at, pending_sync, deleted, metadata, tags, images FROM item_details ORDER BY updated_at DESC, id DESC";

// Hard-delete order for clear_all: dependents before owners.
const CLEAR_TABLES: [&str; 5] = ["item_images", "item_tags", "metadata", "tags", "items"];

impl super::Database {
    /// Creates a new item with its metadata attributes and tag links, all
    /// inside a single transaction, and returns the canonical re-read row.
    pub fn create_item(&self, data: &NewItemData) -> Result<Item> {
        data.validate()?;

        // Serialize outside the transaction; an unserializable map fails
        // before any row is written.
        let attributes_json = if data.metadata.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&data.metadata)?)
        };

        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now_ms = Timestamp::now().as_millisecond();

        tx.execute(
            INSERT_ITEM_SQL,
            params![data.name, data.description, data.category, now_ms, now_ms],
        )
        .db_context("Failed to insert item")?;
        let item_id = tx.last_insert_rowid();

        let metadata_id = match attributes_json {
            Some(json) => {
                tx.execute(INSERT_METADATA_SQL, params![item_id, json, now_ms, now_ms])
                    .db_context("Failed to insert metadata")?;
                Some(tx.last_insert_rowid())
            }
            None => None,
        };

        Self::insert_tag_links(&tx, item_id, metadata_id, &data.tags, now_ms)?;

        tx.commit().db_context("Failed to commit transaction")?;
        log::debug!("created item {item_id}");

        Self::fetch_item(&conn, item_id)?.ok_or(StoreError::ItemNotFound { id: item_id })
    }

    /// Retrieves a live item by its ID. Soft-deleted items read as `None`.
    pub fn get_item(&self, id: i64) -> Result<Option<Item>> {
        let conn = self.conn();
        Self::fetch_item(&conn, id)
    }

    /// Lists all live items, most recently updated first.
    pub fn list_items(&self) -> Result<Vec<Item>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(SELECT_ITEMS_SQL)
            .db_context("Failed to prepare query")?;

        let items = stmt
            .query_map([], Self::build_item_from_row)
            .db_context("Failed to query items")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch items")?;

        Ok(items)
    }

    /// Replaces an item's scalar fields, metadata attributes, and tag set
    /// inside a single transaction, and returns the canonical re-read row.
    ///
    /// Fails with [`StoreError::ItemNotFound`] when the id does not match a
    /// live item; nothing is written in that case.
    pub fn update_item(&self, id: i64, data: &UpdateItemData) -> Result<Item> {
        data.validate()?;

        // A full replacement always stores the map, even when empty.
        let attributes_json = serde_json::to_string(&data.metadata)?;

        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now_ms = Timestamp::now().as_millisecond();

        let rows_affected = tx
            .execute(
                UPDATE_ITEM_SQL,
                params![data.name, data.description, data.category, now_ms, id],
            )
            .db_context("Failed to update item")?;

        if rows_affected == 0 {
            return Err(StoreError::ItemNotFound { id });
        }

        let metadata_id = Self::upsert_metadata(&tx, id, &attributes_json, now_ms)?;
        Self::replace_tag_links(&tx, id, Some(metadata_id), &data.tags, now_ms)?;

        tx.commit().db_context("Failed to commit transaction")?;
        log::debug!("updated item {id}");

        Self::fetch_item(&conn, id)?.ok_or(StoreError::ItemNotFound { id })
    }

    /// Soft-deletes an item, cascading to its metadata, tag links, and
    /// images in the same transaction.
    ///
    /// Idempotent: a missing or already-deleted id is a no-op success, and
    /// the cascade is skipped so repeated calls leave state identical.
    pub fn delete_item(&self, id: i64) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now_ms = Timestamp::now().as_millisecond();

        let rows_affected = tx
            .execute(SOFT_DELETE_ITEM_SQL, params![now_ms, id])
            .db_context("Failed to delete item")?;

        if rows_affected == 0 {
            log::debug!("delete of item {id} was a no-op");
            return Ok(());
        }

        tx.execute(SOFT_DELETE_ITEM_METADATA_SQL, params![now_ms, id])
            .db_context("Failed to delete item metadata")?;
        Self::retire_tag_links(&tx, id, now_ms)?;
        tx.execute(SOFT_DELETE_ITEM_IMAGES_SQL, params![now_ms, id])
            .db_context("Failed to delete item images")?;

        tx.commit().db_context("Failed to commit transaction")?;
        log::debug!("soft-deleted item {id}");
        Ok(())
    }

    /// Hard-deletes every row from every table, dependents first.
    ///
    /// Used only for a full destructive reset. Foreign-key enforcement is
    /// suspended for the duration (the pragma cannot change inside a
    /// transaction) and restored afterwards even when the deletes fail.
    pub fn clear_all(&self) -> Result<()> {
        let mut conn = self.conn();

        conn.execute("PRAGMA foreign_keys = OFF", [])
            .db_context("Failed to disable foreign keys")?;

        let cleared = Self::delete_all_rows(&mut conn);

        let restored = conn
            .execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to re-enable foreign keys")
            .map(|_| ());

        cleared.and(restored)
    }

    fn delete_all_rows(conn: &mut Connection) -> Result<()> {
        let tx = conn
            .transaction()
            .db_context("Failed to begin transaction")?;

        for table in CLEAR_TABLES {
            tx.execute(&format!("DELETE FROM {table}"), [])
                .db_context("Failed to clear table")?;
        }

        tx.commit().db_context("Failed to commit transaction")?;
        log::debug!("cleared all tables");
        Ok(())
    }

    /// Upserts the single live metadata row for an item and returns its id.
    ///
    /// At most one live metadata row per item is a hard invariant: any
    /// surplus live rows are retired in the same statement batch.
    fn upsert_metadata(
        tx: &rusqlite::Transaction<'_>,
        item_id: i64,
        attributes_json: &str,
        now_ms: i64,
    ) -> Result<i64> {
        let existing: Option<i64> = tx
            .query_row(SELECT_LIVE_METADATA_ID_SQL, params![item_id], |row| {
                row.get(0)
            })
            .optional()
            .db_context("Failed to query metadata")?;

        let metadata_id = match existing {
            Some(metadata_id) => {
                tx.execute(
                    UPDATE_METADATA_SQL,
                    params![attributes_json, now_ms, metadata_id],
                )
                .db_context("Failed to update metadata")?;
                metadata_id
            }
            None => {
                tx.execute(
                    INSERT_METADATA_SQL,
                    params![item_id, attributes_json, now_ms, now_ms],
                )
                .db_context("Failed to insert metadata")?;
                tx.last_insert_rowid()
            }
        };

        tx.execute(
            RETIRE_SURPLUS_METADATA_SQL,
            params![now_ms, item_id, metadata_id],
        )
        .db_context("Failed to retire surplus metadata")?;

        Ok(metadata_id)
    }

    /// Canonical single-item read shared by the getters and the re-read
    /// paths of create and update.
    pub(super) fn fetch_item(conn: &Connection, id: i64) -> Result<Option<Item>> {
        let mut stmt = conn
            .prepare(SELECT_ITEM_SQL)
            .db_context("Failed to prepare query")?;

        stmt.query_row(params![id], Self::build_item_from_row)
            .optional()
            .db_context("Failed to query item")
    }
}
