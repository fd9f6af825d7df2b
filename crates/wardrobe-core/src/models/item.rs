//! Item model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Free-form attribute map attached to an item (e.g. `{"color": "red"}`).
///
/// Stored as a serialized JSON object in the metadata table. Values are
/// arbitrary scalars; the map may be empty.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// A catalog record with its related data resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Unique identifier. Durable rows always have positive ids; a negative
    /// id marks a provisional cache entry that has not been persisted yet.
    pub id: i64,

    /// Owning user, reserved for a future sync layer. Never written locally.
    pub user_id: Option<String>,

    /// Display name of the item
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Category label (e.g. "jackets")
    pub category: String,

    /// Timestamp when the item was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the item was last modified (UTC)
    pub updated_at: Timestamp,

    /// Whether this row still has to be pushed to a remote peer
    pub pending_sync: bool,

    /// Soft-delete flag; live reads never return deleted items
    pub deleted: bool,

    /// Resolved metadata attributes
    #[serde(default)]
    pub metadata: Attributes,

    /// Resolved tag names
    #[serde(default)]
    pub tags: Vec<String>,

    /// Resolved image paths (local URIs or remote URLs)
    #[serde(default)]
    pub images: Vec<String>,
}
