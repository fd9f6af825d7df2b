//! Parameter structures for store operations.
//!
//! These are the inputs the UI layer hands to the store. They carry no
//! framework-specific derives; interface layers wrap them as needed and
//! convert via `.into()`.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, StoreError},
    models::Attributes,
};

/// Parameters for creating a new item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewItemData {
    /// Display name of the item (required, non-empty)
    pub name: String,
    /// Free-text description (required, non-empty)
    pub description: String,
    /// Category label (required, non-empty)
    pub category: String,
    /// Metadata attributes; an empty map stores no metadata row
    #[serde(default)]
    pub metadata: Attributes,
    /// Tag names; duplicates within the list collapse to one link
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Parameters for updating an item.
///
/// An update is a full replacement of the scalar fields, the metadata map,
/// and the tag set; it is not a patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItemData {
    /// New display name (required, non-empty)
    pub name: String,
    /// New description (required, non-empty)
    pub description: String,
    /// New category (required, non-empty)
    pub category: String,
    /// Replacement metadata attributes; an empty map is stored as `{}`
    #[serde(default)]
    pub metadata: Attributes,
    /// Replacement tag set
    #[serde(default)]
    pub tags: Vec<String>,
}

fn require_non_empty(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::invalid_input(field, "must not be empty"));
    }
    Ok(())
}

impl NewItemData {
    /// Validates the required scalar fields.
    pub fn validate(&self) -> Result<()> {
        require_non_empty("name", &self.name)?;
        require_non_empty("description", &self.description)?;
        require_non_empty("category", &self.category)
    }
}

impl UpdateItemData {
    /// Validates the required scalar fields.
    ///
    /// Updates replace the whole record, so the same non-empty rules as
    /// creation apply.
    pub fn validate(&self) -> Result<()> {
        require_non_empty("name", &self.name)?;
        require_non_empty("description", &self.description)?;
        require_non_empty("category", &self.category)
    }
}
