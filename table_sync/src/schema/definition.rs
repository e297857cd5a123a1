//! Target table definition
//!
//! The in-memory working set a caller builds up before synchronizing: table
//! name, character encoding, storage engine and the ordered column set.

use indexmap::IndexMap;

use crate::schema::types::ColumnDescriptor;

/// What the caller wants the table to look like.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub character_encoding: String,
    pub storage_engine: Option<String>,
    pub columns: IndexMap<String, ColumnDescriptor>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Insert or replace a column.
    ///
    /// A column whose name matches case-insensitively is discarded and the new
    /// descriptor takes its position.
    pub fn set_column(&mut self, column: ColumnDescriptor) {
        match self.position_of(&column.name) {
            Some(index) => {
                self.columns.shift_remove_index(index);
                self.columns.shift_insert(index, column.name.clone(), column);
            }
            None => {
                self.columns.insert(column.name.clone(), column);
            }
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.position_of(name)
            .and_then(|index| self.columns.get_index(index))
            .map(|(_, column)| column)
    }

    pub fn column_exists(&self, name: &str) -> bool {
        self.position_of(name).is_some()
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.columns
            .get_index_of(name)
            .or_else(|| self.columns.keys().position(|k| k.eq_ignore_ascii_case(name)))
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.values()
    }
}

/// Case-insensitive lookup in an observed or target column map.
pub fn find_column<'a>(
    columns: &'a IndexMap<String, ColumnDescriptor>,
    name: &str,
) -> Option<&'a ColumnDescriptor> {
    columns
        .get(name)
        .or_else(|| columns.values().find(|column| column.is_named(name)))
}
