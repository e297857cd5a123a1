//! Database module for table_sync
//!
//! The collaborators the synchronizer talks to: something that executes
//! statements and something that reports the live schema. The sqlx-backed
//! [`DatabaseConnection`] is both.

pub mod capture;
pub mod connection;
pub mod executor;

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::Result;
use crate::schema::types::ColumnDescriptor;

// Re-export key types
pub use connection::DatabaseConnection;
pub use executor::SqlExecutor;

/// Runs a single SQL statement.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<()>;
}

/// Reports what the live database looks like.
#[async_trait]
pub trait SchemaIntrospector: Send + Sync {
    /// Names of the physical tables called `table_name`; empty when absent.
    async fn fetch_tables(&self, table_name: &str) -> Result<Vec<String>>;

    /// Column definitions of a physical table, in ordinal order.
    async fn fetch_table_schema(
        &self,
        table_name: &str,
    ) -> Result<IndexMap<String, ColumnDescriptor>>;
}

/// A connection that can both run statements and describe tables.
pub trait Database: StatementExecutor + SchemaIntrospector {}

impl<T: StatementExecutor + SchemaIntrospector> Database for T {}
