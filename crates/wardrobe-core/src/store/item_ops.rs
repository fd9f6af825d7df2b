//! Optimistic item operations for the store.

use jiff::Timestamp;
use tokio::task;

use super::WardrobeStore;
use crate::{
    error::{Result, StoreError},
    models::Item,
    params::{NewItemData, UpdateItemData},
};

pub(super) fn join_error(e: task::JoinError) -> StoreError {
    StoreError::Configuration {
        message: format!("Task join error: {e}"),
    }
}

impl WardrobeStore {
    /// Opens the database and applies the schema. Idempotent; awaiting this
    /// before the first mutation avoids a lazy open mid-operation.
    pub async fn initialize(&self) -> Result<()> {
        self.handle().await.map(|_| ())
    }

    /// Reloads every live item from storage and replaces the whole cache.
    ///
    /// Used after external changes (e.g. screen refocus) and as the
    /// correctness fallback: the durable rows are the source of truth.
    pub async fn refresh(&self) -> Result<()> {
        let db = self.handle().await?.clone();
        let items = task::spawn_blocking(move || db.list_items())
            .await
            .map_err(join_error)??;

        log::debug!("refreshed cache with {} items", items.len());
        *self.cache_guard() = items;
        Ok(())
    }

    /// Adds a new item.
    ///
    /// A provisional entry under a synthetic negative id is inserted at the
    /// front of the cache before the durable write starts. On success the
    /// entry is replaced by the canonical item; on failure it is removed
    /// and the error re-raised.
    pub async fn add_item(&self, data: NewItemData) -> Result<Item> {
        let provisional_id = self.next_provisional_id();
        self.cache_guard()
            .insert(0, provisional_item(provisional_id, &data));

        match self.run_create(data).await {
            Ok(item) => {
                let mut cache = self.cache_guard();
                if let Some(entry) = cache.iter_mut().find(|i| i.id == provisional_id) {
                    *entry = item.clone();
                }
                Ok(item)
            }
            Err(err) => {
                log::error!("add_item failed, rolling back provisional entry: {err}");
                self.cache_guard().retain(|i| i.id != provisional_id);
                Err(err)
            }
        }
    }

    /// Updates an item.
    ///
    /// The cached entry is merged optimistically before the durable write;
    /// on success it is replaced by the canonical item, on failure the
    /// prior snapshot is restored at its position. Fails with
    /// [`StoreError::ItemNotFound`] when the id does not match a live item.
    pub async fn update_item(&self, id: i64, data: UpdateItemData) -> Result<Item> {
        let now = Timestamp::now();
        let previous = {
            let mut cache = self.cache_guard();
            cache.iter().position(|i| i.id == id).map(|index| {
                let prior = cache[index].clone();
                cache[index] = merge_update(&prior, &data, now);
                (index, prior)
            })
        };

        match self.run_update(id, data).await {
            Ok(item) => {
                let mut cache = self.cache_guard();
                if let Some(entry) = cache.iter_mut().find(|i| i.id == id) {
                    *entry = item.clone();
                } else {
                    cache.insert(0, item.clone());
                }
                Ok(item)
            }
            Err(err) => {
                log::error!("update_item({id}) failed, rolling back: {err}");
                if let Some((index, prior)) = previous {
                    let mut cache = self.cache_guard();
                    if let Some(entry) = cache.iter_mut().find(|i| i.id == id) {
                        *entry = prior;
                    } else {
                        let index = index.min(cache.len());
                        cache.insert(index, prior);
                    }
                }
                Err(err)
            }
        }
    }

    /// Deletes an item.
    ///
    /// The cached entry is removed optimistically; on failure it is
    /// reinserted at its original position. Idempotent: deleting a missing
    /// or already-deleted id succeeds without changing anything.
    pub async fn delete_item(&self, id: i64) -> Result<()> {
        let removed = {
            let mut cache = self.cache_guard();
            cache
                .iter()
                .position(|i| i.id == id)
                .map(|index| (index, cache.remove(index)))
        };

        match self.run_delete(id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                log::error!("delete_item({id}) failed, rolling back: {err}");
                if let Some((index, item)) = removed {
                    let mut cache = self.cache_guard();
                    let index = index.min(cache.len());
                    cache.insert(index, item);
                }
                Err(err)
            }
        }
    }

    /// Hard-deletes everything. Destructive and irreversible once the
    /// durable write commits; on failure the cache snapshot is restored.
    pub async fn clear_all(&self) -> Result<()> {
        let snapshot = std::mem::take(&mut *self.cache_guard());

        match self.run_clear().await {
            Ok(()) => Ok(()),
            Err(err) => {
                log::error!("clear_all failed, rolling back: {err}");
                *self.cache_guard() = snapshot;
                Err(err)
            }
        }
    }

    async fn run_create(&self, data: NewItemData) -> Result<Item> {
        let db = self.handle().await?.clone();
        task::spawn_blocking(move || db.create_item(&data))
            .await
            .map_err(join_error)?
    }

    async fn run_update(&self, id: i64, data: UpdateItemData) -> Result<Item> {
        let db = self.handle().await?.clone();
        task::spawn_blocking(move || db.update_item(id, &data))
            .await
            .map_err(join_error)?
    }

    async fn run_delete(&self, id: i64) -> Result<()> {
        let db = self.handle().await?.clone();
        task::spawn_blocking(move || db.delete_item(id))
            .await
            .map_err(join_error)?
    }

    async fn run_clear(&self) -> Result<()> {
        let db = self.handle().await?.clone();
        task::spawn_blocking(move || db.clear_all())
            .await
            .map_err(join_error)?
    }
}

/// Synthesizes the provisional cache entry for a not-yet-persisted item.
pub(super) fn provisional_item(id: i64, data: &NewItemData) -> Item {
    let now = Timestamp::now();
    Item {
        id,
        user_id: None,
        name: data.name.clone(),
        description: data.description.clone(),
        category: data.category.clone(),
        created_at: now,
        updated_at: now,
        pending_sync: true,
        deleted: false,
        metadata: data.metadata.clone(),
        tags: data.tags.clone(),
        images: Vec::new(),
    }
}

/// Merges an update over the previous snapshot with a fixed field list.
///
/// Only the fields of the update contract change; everything else is
/// carried from the snapshot, so unexpected fields can never be absorbed.
pub(super) fn merge_update(previous: &Item, data: &UpdateItemData, now: Timestamp) -> Item {
    Item {
        id: previous.id,
        user_id: previous.user_id.clone(),
        name: data.name.clone(),
        description: data.description.clone(),
        category: data.category.clone(),
        created_at: previous.created_at,
        updated_at: now,
        pending_sync: true,
        deleted: previous.deleted,
        metadata: data.metadata.clone(),
        tags: data.tags.clone(),
        images: previous.images.clone(),
    }
}
