//! Row conversion helpers for reads from the `item_details` view.

use jiff::Timestamp;
use rusqlite::types::Type;

use crate::models::{Attributes, Item};

impl super::Database {
    /// Helper function to construct an [`Item`] from an `item_details` row.
    ///
    /// Column order: id, user_id, name, description, category, created_at,
    /// updated_at, pending_sync, deleted, metadata, tags, images.
    pub(super) fn build_item_from_row(row: &rusqlite::Row) -> rusqlite::Result<Item> {
        let metadata_str: Option<String> = row.get(9)?;

        Ok(Item {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            category: row.get(4)?,
            created_at: timestamp_from_millis(row.get(5)?, 5)?,
            updated_at: timestamp_from_millis(row.get(6)?, 6)?,
            pending_sync: row.get::<_, i64>(7)? != 0,
            deleted: row.get::<_, i64>(8)? != 0,
            metadata: parse_attributes(metadata_str.as_deref()),
            tags: split_concat(row.get::<_, Option<String>>(10)?),
            images: split_concat(row.get::<_, Option<String>>(11)?),
        })
    }
}

/// Parses a stored attributes JSON object.
///
/// Malformed or missing data is recovered as an empty map; a live read must
/// never fail on bad metadata.
fn parse_attributes(raw: Option<&str>) -> Attributes {
    let Some(raw) = raw else {
        return Attributes::new();
    };
    match serde_json::from_str::<Attributes>(raw) {
        Ok(map) => map,
        Err(err) => {
            log::warn!("discarding malformed attributes: {err}");
            Attributes::new()
        }
    }
}

/// Splits a `GROUP_CONCAT` aggregate into its parts. Null or empty input
/// yields an empty list.
fn split_concat(raw: Option<String>) -> Vec<String> {
    raw.map(|joined| {
        joined
            .split(',')
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

fn timestamp_from_millis(millis: i64, column: usize) -> rusqlite::Result<Timestamp> {
    Timestamp::from_millisecond(millis)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Integer, Box::new(e)))
}
