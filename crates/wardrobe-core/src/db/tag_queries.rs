//! Tag dedup and item-tag link management.
//!
//! Tags are deduplicated by exact name: linking an item to a name that
//! already exists reuses the existing tag row. Link rows are never patched
//! in place; replacing an item's tag set soft-deletes the live links and
//! inserts fresh ones.

use rusqlite::{params, OptionalExtension, Transaction};

use crate::error::{DatabaseResultExt, Result};

const SELECT_TAG_BY_NAME_SQL: &str = "SELECT id FROM tags WHERE name = ?1 LIMIT 1";
const INSERT_TAG_SQL: &str =
    "INSERT INTO tags (name, created_at, updated_at, pending_sync) VALUES (?1, ?2, ?3, 1)";
const INSERT_ITEM_TAG_SQL: &str = "INSERT INTO item_tags (item_id, tag_id, metadata_id, created_at, updated_at, pending_sync) VALUES (?1, ?2, ?3, ?4, ?5, 1)";
const RETIRE_ITEM_TAG_LINKS_SQL: &str =
    "UPDATE item_tags SET deleted = 1, pending_sync = 1, updated_at = ?1 WHERE item_id = ?2 AND deleted = 0";

impl super::Database {
    /// Looks up a tag by exact name, inserting it if absent. Returns the
    /// tag's id.
    fn ensure_tag(tx: &Transaction<'_>, name: &str, now_ms: i64) -> Result<i64> {
        let existing: Option<i64> = tx
            .query_row(SELECT_TAG_BY_NAME_SQL, params![name], |row| row.get(0))
            .optional()
            .db_context("Failed to query tag")?;

        match existing {
            Some(id) => Ok(id),
            None => {
                tx.execute(INSERT_TAG_SQL, params![name, now_ms, now_ms])
                    .db_context("Failed to insert tag")?;
                Ok(tx.last_insert_rowid())
            }
        }
    }

    /// Inserts one live link per distinct, non-empty tag name.
    pub(super) fn insert_tag_links(
        tx: &Transaction<'_>,
        item_id: i64,
        metadata_id: Option<i64>,
        tags: &[String],
        now_ms: i64,
    ) -> Result<()> {
        let mut seen: Vec<&str> = Vec::new();
        for raw in tags {
            let name = raw.trim();
            if name.is_empty() || seen.contains(&name) {
                continue;
            }
            seen.push(name);

            let tag_id = Self::ensure_tag(tx, name, now_ms)?;
            tx.execute(
                INSERT_ITEM_TAG_SQL,
                params![item_id, tag_id, metadata_id, now_ms, now_ms],
            )
            .db_context("Failed to insert item tag link")?;
        }
        Ok(())
    }

    /// Soft-deletes every live tag link of an item.
    pub(super) fn retire_tag_links(
        tx: &Transaction<'_>,
        item_id: i64,
        now_ms: i64,
    ) -> Result<()> {
        tx.execute(RETIRE_ITEM_TAG_LINKS_SQL, params![now_ms, item_id])
            .db_context("Failed to retire item tag links")?;
        Ok(())
    }

    /// Replaces the item's tag set: retires every live link, then inserts
    /// fresh links for the provided names.
    pub(super) fn replace_tag_links(
        tx: &Transaction<'_>,
        item_id: i64,
        metadata_id: Option<i64>,
        tags: &[String],
        now_ms: i64,
    ) -> Result<()> {
        Self::retire_tag_links(tx, item_id, now_ms)?;
        Self::insert_tag_links(tx, item_id, metadata_id, tags, now_ms)
    }
}
