//! Engine-specific SQL generation
//!
//! A [`StructureDriver`] turns table definitions and diffs into statements
//! for one database engine. Capabilities an engine lacks are reported as
//! [`Error::UnsupportedOperation`] instead of producing SQL.

mod mysql;
mod sqlite;

pub use mysql::MySqlDriver;
pub use sqlite::SqliteDriver;

use crate::error::{Error, Result};
use crate::schema::definition::TableDefinition;
use crate::schema::diff::TableDiff;
use crate::schema::types::ColumnDescriptor;
use crate::utils::naming::{format_identifier_list, format_sql_identifier, format_sql_literal};

/// SQL generator for one database engine
pub trait StructureDriver: Send + Sync {
    /// Engine name as used in configuration and error messages.
    fn name(&self) -> &'static str;

    fn quote(&self, identifier: &str) -> String {
        format_sql_identifier(identifier, self.name())
    }

    fn quote_list(&self, identifiers: &[String]) -> String {
        format_identifier_list(identifiers, self.name())
    }

    /// The form of a column that survives a round trip through this engine.
    ///
    /// Target and observed columns are compared in this form.
    fn comparable(&self, column: &ColumnDescriptor) -> ColumnDescriptor {
        column.clone()
    }

    fn create_table(&self, table_name: &str, definition: &TableDefinition) -> Result<Vec<String>>;

    fn drop_table(&self, table_name: &str) -> Result<Vec<String>>;

    fn alter_table(&self, table_name: &str, diff: &TableDiff) -> Result<Vec<String>>;

    fn drop_column(&self, table_name: &str, column_name: &str) -> Result<Vec<String>>;

    fn rename_column(&self, table_name: &str, old_name: &str, new_name: &str)
        -> Result<Vec<String>>;

    fn rename_table(&self, old_name: &str, new_name: &str) -> Result<Vec<String>>;

    /// Create or replace a view.
    fn create_view(&self, view_name: &str, query: &str) -> Result<Vec<String>>;

    /// Validate a storage engine name.
    fn check_engine(&self, engine: &str) -> Result<()>;
}

/// Look up the driver for a configured engine name.
pub fn for_name(name: &str) -> Result<Box<dyn StructureDriver>> {
    match name.to_lowercase().as_str() {
        "mysql" => Ok(Box::new(MySqlDriver)),
        "sqlite" => Ok(Box::new(SqliteDriver)),
        other => Err(Error::ConfigError(format!(
            "Unsupported database driver: {}",
            other
        ))),
    }
}

/// Render a column default as SQL.
///
/// `CURRENT_TIMESTAMP` is passed through; everything else becomes a string
/// literal.
pub(crate) fn default_literal(value: &str) -> String {
    if value.eq_ignore_ascii_case("CURRENT_TIMESTAMP") {
        value.to_uppercase()
    } else {
        format_sql_literal(value)
    }
}
