use tempfile::TempDir;
use wardrobe_core::{StoreBuilder, WardrobeStore};

/// Helper function to create a test store backed by a throwaway database
pub async fn create_test_store() -> (TempDir, WardrobeStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let store = StoreBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .expect("Failed to create store");
    store
        .initialize()
        .await
        .expect("Failed to initialize store");
    (temp_dir, store)
}
