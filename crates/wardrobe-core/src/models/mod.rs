//! Data models for the wardrobe catalog.
//!
//! The only domain entity surfaced to callers is [`Item`]: the catalog
//! record with its metadata attributes, tag names, and image paths already
//! resolved from the relational tables. Metadata, tag, link, and image rows
//! exist in storage but are never handed out individually; the repository
//! folds them into the item they belong to.

pub mod item;


pub use item::{Attributes, Item};
