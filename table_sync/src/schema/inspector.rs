//! Observed table state
//!
//! What the live database last reported for the current table. Observations
//! are kept per physical table name and stay cached until the owning session
//! is reset or moves on to another table.

use indexmap::IndexMap;

use crate::db::SchemaIntrospector;
use crate::error::Result;
use crate::schema::types::ColumnDescriptor;

/// Cached observations for one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservedState {
    /// Physical table the observations belong to.
    pub table: String,
    /// `None` until the database has been asked.
    pub table_exists: Option<bool>,
    pub existing_columns: Option<IndexMap<String, ColumnDescriptor>>,
}

impl ObservedState {
    pub fn clear(&mut self) {
        self.table.clear();
        self.table_exists = None;
        self.existing_columns = None;
    }

    /// Forget everything if the observations were made for another table.
    pub fn focus(&mut self, table: &str) {
        if self.table != table {
            self.clear();
            self.table = table.to_string();
        }
    }

    /// Record that the table now has exactly `columns`.
    pub fn record(&mut self, columns: IndexMap<String, ColumnDescriptor>) {
        self.table_exists = Some(true);
        self.existing_columns = Some(columns);
    }
}

/// Ask the database whether the physical table `table_name` exists.
pub async fn query_table_exists<I>(introspector: &I, table_name: &str) -> Result<bool>
where
    I: SchemaIntrospector + ?Sized,
{
    if table_name.is_empty() {
        return Ok(false);
    }

    let tables = introspector.fetch_tables(table_name).await?;
    Ok(!tables.is_empty())
}
