//! table_sync: declare a table's columns and keys, then create or alter the
//! live table to match
//!
//! A [`TableStructure`] session collects a target table definition through a
//! fluent column API and reconciles it with what the database reports. Every
//! statement goes through one funnel that can capture SQL instead of running
//! it, so a synchronization can be previewed without side effects.

pub mod config;
pub mod db;
pub mod error;
pub mod schema;
pub mod spec_file;
pub mod utils;

// Re-export main types for easier access
pub use config::{Config, StructureConfig};
pub use db::{Database, DatabaseConnection, SchemaIntrospector, StatementExecutor};
pub use error::{Error, Result};
pub use schema::{
    ColumnDescriptor, KeyAssignment, KeyKind, KeyTag, KeyTags, NullDefault, StructureDriver,
    SyncOutcome, TableStructure, TypeSpec,
};
pub use spec_file::TableSpecFile;

/// Open a session from the specified configuration file
pub async fn init(config_path: &str) -> Result<TableStructure<DatabaseConnection>> {
    let config = config::load_from_file(config_path)?;
    connect(&config).await
}

/// Connect to the configured database and open a session on it
pub async fn connect(config: &Config) -> Result<TableStructure<DatabaseConnection>> {
    let connection = DatabaseConnection::connect(&config.database).await?;
    let driver = connection.structure_driver()?;
    Ok(TableStructure::new(
        connection,
        driver,
        config.structure.clone(),
    ))
}
