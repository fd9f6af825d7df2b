//! Core library for the wardrobe catalog application.
//!
//! This crate provides the local-first data layer for a personal inventory
//! of wardrobe items: an embedded SQLite store with atomic multi-table
//! operations, and an in-memory item cache that is updated optimistically
//! ahead of persistence to keep the interface responsive.
//!
//! # Architecture
//!
//! - **Models** ([`models`]): the [`Item`] record with its metadata
//!   attributes, tag names, and image paths resolved
//! - **Record Repository** ([`db`]): transactional CRUD over the items,
//!   metadata, tags, item_tags, and item_images tables, read through a
//!   live-filtered join view
//! - **Store** ([`store`]): the UI-facing API — a lazily opened shared
//!   database handle plus the optimistic cache & reconciliation layer
//!
//! Rows are soft-deleted and flagged `pending_sync` so a future sync
//! process can identify dirty rows; no remote peer is implemented here.
//!
//! # Quick Start
//!
//! ```rust
//! use wardrobe_core::{NewItemData, StoreBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = StoreBuilder::new()
//!     .with_database_path(Some("wardrobe.db"))
//!     .build()?;
//! store.initialize().await?;
//!
//! // Create an item; the cache picks it up optimistically.
//! let item = store
//!     .add_item(NewItemData {
//!         name: "Denim jacket".to_string(),
//!         description: "Light wash, slightly oversized".to_string(),
//!         category: "jackets".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("created item {}", item.id);
//!
//! // Synchronous snapshot read for list rendering.
//! for item in store.cached_items() {
//!     println!("{}: {}", item.id, item.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod params;
pub mod store;

// Re-export commonly used types
pub use db::Database;
pub use error::{Result, StoreError};
pub use models::{Attributes, Item};
pub use params::{NewItemData, UpdateItemData};
pub use store::{StoreBuilder, WardrobeStore};
