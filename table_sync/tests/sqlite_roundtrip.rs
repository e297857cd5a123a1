//! Create, introspect and alter a real SQLite database

use pretty_assertions::assert_eq;

use table_sync::config::DatabaseConfig;
use table_sync::{
    DatabaseConnection, Error, KeyKind, KeyTags, StructureConfig, SyncOutcome, TableStructure,
};

async fn open() -> TableStructure<DatabaseConnection> {
    // One connection, so every query sees the same in-memory database.
    let config = DatabaseConfig {
        driver: "sqlite".to_string(),
        url: "sqlite::memory:".to_string(),
        pool_size: Some(1),
        timeout_seconds: Some(5),
    };
    let connection = DatabaseConnection::connect(&config).await.unwrap();
    let driver = connection.structure_driver().unwrap();

    TableStructure::new(
        connection,
        driver,
        StructureConfig {
            table_prefix: "GDN_".to_string(),
            ..StructureConfig::default()
        },
    )
}

fn define_discussion(structure: &mut TableStructure<DatabaseConnection>) {
    structure
        .table("Discussion", None)
        .primary_key("DiscussionID", "int")
        .column("Name", "varchar(100)", false, "index")
        .column("Slug", "varchar(100)", false, "unique")
        .column("Status", ["open", "closed"], "open", KeyTags::none())
        .column("Score", "udecimal(5,2)", true, KeyTags::none())
        .column("DateInserted", "datetime", false, ["index.ByDate", "key"]);
}

#[tokio::test]
async fn test_create_then_resynchronize() {
    let mut structure = open().await;
    define_discussion(&mut structure);

    assert!(!structure.table_exists().await.unwrap());
    assert_eq!(structure.synchronize(false, false).await.unwrap(), SyncOutcome::Created);

    // Start over so the second pass reads everything back from SQLite.
    structure.reset();
    define_discussion(&mut structure);
    assert!(structure.table_exists().await.unwrap());
    assert_eq!(structure.synchronize(false, false).await.unwrap(), SyncOutcome::Unchanged);

    let existing = structure.existing_columns().await.unwrap().clone();
    let names: Vec<&str> = existing.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec!["DiscussionID", "Name", "Slug", "Status", "Score", "DateInserted"]
    );

    let id = &existing["DiscussionID"];
    assert!(id.auto_increment);
    assert!(id.key_type.is_primary());
    assert!(!id.allow_null);

    assert!(existing["Slug"].key_type.contains(KeyKind::Unique));
    assert_eq!(existing["Status"].default.as_deref(), Some("open"));
    assert_eq!(existing["Score"].precision, Some(2));
    assert!(existing["DateInserted"].key_type.contains(KeyKind::Key));
}

#[tokio::test]
async fn test_add_column_and_index() {
    let mut structure = open().await;
    define_discussion(&mut structure);
    structure.synchronize(false, false).await.unwrap();

    structure.reset();
    define_discussion(&mut structure);
    structure.column("Body", "text", "", "fulltext");
    assert_eq!(structure.synchronize(false, false).await.unwrap(), SyncOutcome::Modified);

    structure.reset();
    structure.table("Discussion", None);
    assert!(structure.column_exists("body").await.unwrap());
    let body = structure.existing_columns().await.unwrap()["Body"].clone();
    assert!(body.key_type.contains(KeyKind::Fulltext));
    assert_eq!(body.default.as_deref(), Some(""));
}

#[tokio::test]
async fn test_modifying_a_column_is_unsupported() {
    let mut structure = open().await;
    define_discussion(&mut structure);
    structure.synchronize(false, false).await.unwrap();

    structure.reset();
    define_discussion(&mut structure);
    structure.column("Name", "varchar(200)", false, "index");

    let error = structure.synchronize(false, false).await.unwrap_err();
    assert!(matches!(error, Error::UnsupportedOperation { engine: "sqlite", .. }));
}

#[tokio::test]
async fn test_drop_and_recreate() {
    let mut structure = open().await;
    define_discussion(&mut structure);
    structure.synchronize(false, false).await.unwrap();

    structure.reset();
    define_discussion(&mut structure);
    structure.column("Name", "varchar(200)", false, "index");
    assert_eq!(structure.synchronize(false, true).await.unwrap(), SyncOutcome::Recreated);

    structure.reset();
    structure.table("Discussion", None);
    let name = structure.existing_columns().await.unwrap()["Name"].clone();
    assert_eq!(name.length, Some(200));
}

#[tokio::test]
async fn test_untyped_column_resynchronizes_cleanly() {
    let mut structure = open().await;
    structure
        .table("Counter", None)
        .primary_key("CounterID", "int")
        .column("Hits", "", true, KeyTags::none());
    assert_eq!(structure.synchronize(false, false).await.unwrap(), SyncOutcome::Created);

    structure.reset();
    structure
        .table("Counter", None)
        .primary_key("CounterID", "int")
        .column("Hits", "", true, KeyTags::none());
    assert_eq!(structure.synchronize(false, false).await.unwrap(), SyncOutcome::Unchanged);
}
