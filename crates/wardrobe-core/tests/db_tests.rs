use std::{path::Path, thread, time::Duration};

use rusqlite::{params, Connection};
use tempfile::NamedTempFile;
use wardrobe_core::{Attributes, Database, NewItemData, StoreError, UpdateItemData};

/// Helper function to create a temporary database for testing
fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}

fn attributes(pairs: &[(&str, &str)]) -> Attributes {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).into()))
        .collect()
}

fn item_data(name: &str, metadata: &[(&str, &str)], tags: &[&str]) -> NewItemData {
    NewItemData {
        name: name.to_string(),
        description: format!("{name} description"),
        category: "jackets".to_string(),
        metadata: attributes(metadata),
        tags: tags.iter().map(|t| (*t).to_string()).collect(),
    }
}

fn update_data(name: &str, metadata: &[(&str, &str)], tags: &[&str]) -> UpdateItemData {
    UpdateItemData {
        name: name.to_string(),
        description: format!("{name} updated"),
        category: "coats".to_string(),
        metadata: attributes(metadata),
        tags: tags.iter().map(|t| (*t).to_string()).collect(),
    }
}

/// Opens a second connection for direct storage inspection.
fn raw_connection(path: &Path) -> Connection {
    Connection::open(path).expect("Failed to open inspection connection")
}

fn count_rows(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0))
        .expect("Failed to count rows")
}

fn sorted(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values
}

#[test]
fn test_database_initialization() {
    let (temp_file, _db) = create_test_db();

    assert!(temp_file.path().exists());

    // Re-opening must be safe: the schema is fully idempotent.
    let _again = Database::new(temp_file.path()).expect("Failed to re-open database");
}

#[test]
fn test_create_item_round_trip() {
    let (_temp_file, db) = create_test_db();

    let created = db
        .create_item(&item_data("Denim jacket", &[("color", "red")], &["casual", "blue"]))
        .expect("Failed to create item");

    assert!(created.id > 0);
    assert!(created.pending_sync);
    assert!(!created.deleted);

    let item = db
        .get_item(created.id)
        .expect("Failed to get item")
        .expect("Item should exist");

    assert_eq!(item.name, "Denim jacket");
    assert_eq!(item.metadata, attributes(&[("color", "red")]));
    assert_eq!(
        sorted(item.tags),
        vec!["blue".to_string(), "casual".to_string()]
    );
    assert!(item.images.is_empty());
}

#[test]
fn test_create_item_requires_scalar_fields() {
    let (temp_file, db) = create_test_db();

    let err = db
        .create_item(&item_data("", &[], &[]))
        .expect_err("Blank name must be rejected");
    assert!(matches!(err, StoreError::InvalidInput { ref field, .. } if field == "name"));

    let conn = raw_connection(temp_file.path());
    assert_eq!(count_rows(&conn, "SELECT COUNT(*) FROM items"), 0);
}

#[test]
fn test_create_item_without_metadata_or_tags() {
    let (temp_file, db) = create_test_db();

    let created = db
        .create_item(&item_data("Scarf", &[], &[]))
        .expect("Failed to create item");

    assert!(created.metadata.is_empty());
    assert!(created.tags.is_empty());

    // An empty map stores no metadata row at all.
    let conn = raw_connection(temp_file.path());
    assert_eq!(count_rows(&conn, "SELECT COUNT(*) FROM metadata"), 0);
    assert_eq!(count_rows(&conn, "SELECT COUNT(*) FROM item_tags"), 0);
}

#[test]
fn test_tag_dedup_across_items() {
    let (temp_file, db) = create_test_db();

    db.create_item(&item_data("Shirt", &[], &["summer", "casual"]))
        .expect("Failed to create first item");
    db.create_item(&item_data("Shorts", &[], &["summer"]))
        .expect("Failed to create second item");

    let conn = raw_connection(temp_file.path());
    assert_eq!(
        count_rows(&conn, "SELECT COUNT(*) FROM tags WHERE name = 'summer'"),
        1
    );
    assert_eq!(
        count_rows(
            &conn,
            "SELECT COUNT(*) FROM item_tags it JOIN tags t ON t.id = it.tag_id \
             WHERE t.name = 'summer' AND it.deleted = 0"
        ),
        2
    );
}

#[test]
fn test_duplicate_tag_names_collapse_within_request() {
    let (temp_file, db) = create_test_db();

    let created = db
        .create_item(&item_data("Hat", &[], &["red", "red", " red "]))
        .expect("Failed to create item");

    assert_eq!(created.tags, vec!["red".to_string()]);

    let conn = raw_connection(temp_file.path());
    assert_eq!(count_rows(&conn, "SELECT COUNT(*) FROM item_tags"), 1);
    assert_eq!(count_rows(&conn, "SELECT COUNT(*) FROM tags"), 1);
}

#[test]
fn test_update_item_replaces_fields_metadata_and_tags() {
    let (temp_file, db) = create_test_db();

    let created = db
        .create_item(&item_data("Jacket", &[("color", "red")], &["casual", "blue"]))
        .expect("Failed to create item");

    let updated = db
        .update_item(created.id, &update_data("Coat", &[("size", "M")], &["formal", "blue"]))
        .expect("Failed to update item");

    assert_eq!(updated.name, "Coat");
    assert_eq!(updated.category, "coats");
    assert_eq!(updated.metadata, attributes(&[("size", "M")]));
    assert_eq!(
        sorted(updated.tags),
        vec!["blue".to_string(), "formal".to_string()]
    );
    assert!(updated.pending_sync);

    let conn = raw_connection(temp_file.path());
    // Exactly one live metadata row carries the replacement map.
    assert_eq!(
        count_rows(&conn, "SELECT COUNT(*) FROM metadata WHERE deleted = 0"),
        1
    );
    // The old links are retired, not removed; fresh links are live.
    assert_eq!(
        count_rows(&conn, "SELECT COUNT(*) FROM item_tags WHERE deleted = 1"),
        2
    );
    assert_eq!(
        count_rows(&conn, "SELECT COUNT(*) FROM item_tags WHERE deleted = 0"),
        2
    );
    // "blue" was reused; only "formal" is new.
    assert_eq!(count_rows(&conn, "SELECT COUNT(*) FROM tags"), 3);
}

#[test]
fn test_update_inserts_metadata_when_absent() {
    let (temp_file, db) = create_test_db();

    let created = db
        .create_item(&item_data("Belt", &[], &[]))
        .expect("Failed to create item");

    let updated = db
        .update_item(created.id, &update_data("Belt", &[("material", "leather")], &[]))
        .expect("Failed to update item");

    assert_eq!(updated.metadata, attributes(&[("material", "leather")]));

    let conn = raw_connection(temp_file.path());
    assert_eq!(
        count_rows(&conn, "SELECT COUNT(*) FROM metadata WHERE deleted = 0"),
        1
    );
}

#[test]
fn test_update_missing_item() {
    let (temp_file, db) = create_test_db();

    let err = db
        .update_item(9999, &update_data("Ghost", &[], &[]))
        .expect_err("Updating a missing item must fail");
    assert!(matches!(err, StoreError::ItemNotFound { id: 9999 }));

    // The failed update must leave nothing behind.
    let conn = raw_connection(temp_file.path());
    assert_eq!(count_rows(&conn, "SELECT COUNT(*) FROM metadata"), 0);
    assert_eq!(count_rows(&conn, "SELECT COUNT(*) FROM item_tags"), 0);
}

#[test]
fn test_update_soft_deleted_item_fails() {
    let (_temp_file, db) = create_test_db();

    let created = db
        .create_item(&item_data("Vest", &[], &[]))
        .expect("Failed to create item");
    db.delete_item(created.id).expect("Failed to delete item");

    let err = db
        .update_item(created.id, &update_data("Vest", &[], &[]))
        .expect_err("Updating a deleted item must fail");
    assert!(matches!(err, StoreError::ItemNotFound { .. }));
}

#[test]
fn test_cascade_soft_delete() {
    let (temp_file, db) = create_test_db();

    let created = db
        .create_item(&item_data("Jacket", &[("color", "red")], &["casual"]))
        .expect("Failed to create item");

    // Images enter storage out of band; plant one to observe the cascade.
    let conn = raw_connection(temp_file.path());
    conn.execute(
        "INSERT INTO item_images (item_id, image_path, created_at, updated_at, pending_sync, deleted) \
         VALUES (?1, 'file:///jacket.jpg', 0, 0, 0, 0)",
        params![created.id],
    )
    .expect("Failed to insert image row");

    db.delete_item(created.id).expect("Failed to delete item");

    assert_eq!(
        count_rows(&conn, "SELECT COUNT(*) FROM items WHERE deleted = 0"),
        0
    );
    assert_eq!(
        count_rows(&conn, "SELECT COUNT(*) FROM metadata WHERE deleted = 0"),
        0
    );
    assert_eq!(
        count_rows(&conn, "SELECT COUNT(*) FROM item_tags WHERE deleted = 0"),
        0
    );
    assert_eq!(
        count_rows(&conn, "SELECT COUNT(*) FROM item_images WHERE deleted = 0"),
        0
    );
    // Dependents are re-flagged for the future sync pass.
    assert_eq!(
        count_rows(
            &conn,
            "SELECT COUNT(*) FROM item_images WHERE pending_sync = 1"
        ),
        1
    );

    // A deleted item is gone from every live read.
    assert!(db
        .get_item(created.id)
        .expect("Failed to get item")
        .is_none());
    assert!(db.list_items().expect("Failed to list items").is_empty());
}

#[test]
fn test_idempotent_delete() {
    let (temp_file, db) = create_test_db();

    let created = db
        .create_item(&item_data("Jacket", &[("color", "red")], &["casual"]))
        .expect("Failed to create item");

    db.delete_item(created.id).expect("First delete failed");

    let conn = raw_connection(temp_file.path());
    let snapshot = |conn: &Connection| -> Vec<(i64, i64, i64)> {
        let mut stmt = conn
            .prepare("SELECT id, updated_at, deleted FROM metadata ORDER BY id")
            .expect("Failed to prepare snapshot query");
        stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .expect("Failed to query snapshot")
            .collect::<Result<Vec<_>, _>>()
            .expect("Failed to collect snapshot")
    };
    let before = snapshot(&conn);

    // A later second delete must not touch the rows again.
    thread::sleep(Duration::from_millis(10));
    db.delete_item(created.id).expect("Second delete failed");

    assert_eq!(snapshot(&conn), before);

    // Deleting an id that never existed is also a no-op success.
    db.delete_item(424_242).expect("Missing-id delete failed");
}

#[test]
fn test_atomicity_on_injected_failure() {
    let (temp_file, db) = create_test_db();

    // Make the final statement of the create fail deterministically.
    let conn = raw_connection(temp_file.path());
    conn.execute_batch(
        "CREATE TRIGGER fail_item_tags BEFORE INSERT ON item_tags \
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
    )
    .expect("Failed to create trigger");

    let err = db
        .create_item(&item_data("Jacket", &[("color", "red")], &["casual"]))
        .expect_err("Create must fail through the trigger");
    assert!(matches!(err, StoreError::Database { .. }));

    // The transaction rolled back: no partial rows in any table.
    for table in ["items", "metadata", "tags", "item_tags", "item_images"] {
        assert_eq!(
            count_rows(&conn, &format!("SELECT COUNT(*) FROM {table}")),
            0,
            "table {table} must be empty after rollback"
        );
    }
}

#[test]
fn test_clear_all_on_empty_store() {
    let (temp_file, db) = create_test_db();

    db.clear_all().expect("Failed to clear empty store");

    let conn = raw_connection(temp_file.path());
    for table in ["items", "metadata", "tags", "item_tags", "item_images"] {
        assert_eq!(count_rows(&conn, &format!("SELECT COUNT(*) FROM {table}")), 0);
    }
    assert!(db.list_items().expect("Failed to list items").is_empty());
}

#[test]
fn test_clear_all_removes_every_row() {
    let (temp_file, db) = create_test_db();

    let first = db
        .create_item(&item_data("Jacket", &[("color", "red")], &["casual"]))
        .expect("Failed to create first item");
    db.create_item(&item_data("Coat", &[("size", "L")], &["winter", "casual"]))
        .expect("Failed to create second item");

    let conn = raw_connection(temp_file.path());
    conn.execute(
        "INSERT INTO item_images (item_id, image_path, created_at, updated_at) \
         VALUES (?1, 'file:///jacket.jpg', 0, 0)",
        params![first.id],
    )
    .expect("Failed to insert image row");

    db.clear_all().expect("Failed to clear store");

    for table in ["items", "metadata", "tags", "item_tags", "item_images"] {
        assert_eq!(
            count_rows(&conn, &format!("SELECT COUNT(*) FROM {table}")),
            0,
            "table {table} must be empty after clear"
        );
    }

    // The store stays usable after the reset.
    db.create_item(&item_data("Fresh start", &[], &[]))
        .expect("Failed to create item after clear");
}

#[test]
fn test_list_items_orders_by_most_recently_updated() {
    let (_temp_file, db) = create_test_db();

    let first = db
        .create_item(&item_data("First", &[], &[]))
        .expect("Failed to create first item");
    thread::sleep(Duration::from_millis(10));
    let second = db
        .create_item(&item_data("Second", &[], &[]))
        .expect("Failed to create second item");

    let items = db.list_items().expect("Failed to list items");
    assert_eq!(
        items.iter().map(|i| i.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );

    // Updating the older item moves it to the front.
    thread::sleep(Duration::from_millis(10));
    db.update_item(first.id, &update_data("First", &[], &[]))
        .expect("Failed to update item");

    let items = db.list_items().expect("Failed to list items");
    assert_eq!(
        items.iter().map(|i| i.id).collect::<Vec<_>>(),
        vec![first.id, second.id]
    );
}

#[test]
fn test_malformed_metadata_reads_as_empty_map() {
    let (temp_file, db) = create_test_db();

    let created = db
        .create_item(&item_data("Jacket", &[("color", "red")], &[]))
        .expect("Failed to create item");

    let conn = raw_connection(temp_file.path());
    conn.execute("UPDATE metadata SET attributes = 'not json'", [])
        .expect("Failed to corrupt metadata");

    // A corrupt attributes blob must never fail a read.
    let item = db
        .get_item(created.id)
        .expect("Failed to get item")
        .expect("Item should exist");
    assert!(item.metadata.is_empty());

    let items = db.list_items().expect("Failed to list items");
    assert_eq!(items.len(), 1);
    assert!(items[0].metadata.is_empty());
}
