//! SQLite statement generation
//!
//! SQLite cannot change an existing column in place, so modify mode is
//! limited to adding columns and reshaping indexes.

use crate::error::{Error, Result};
use crate::schema::catalog::{quote_values, render_type_string};
use crate::schema::definition::TableDefinition;
use crate::schema::diff::TableDiff;
use crate::schema::driver::{default_literal, StructureDriver};
use crate::schema::keys::{plan_indexes, IndexDef};
use crate::schema::types::{ColumnDescriptor, KeyKind};

/// SQLite dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl SqliteDriver {
    fn unsupported(&self, operation: &str) -> Error {
        Error::unsupported(self.name(), operation)
    }

    fn column_type(&self, column: &ColumnDescriptor, rowid_alias: bool) -> String {
        if rowid_alias {
            return "integer".to_string();
        }
        match column.data_type.as_str() {
            "enum" => "enum".to_string(),
            "set" => "text".to_string(),
            _ => render_type_string(column),
        }
    }

    fn column_definition(&self, column: &ColumnDescriptor, rowid_alias: bool) -> String {
        let name = self.quote(&column.name);
        let mut sql = format!("{} {}", name, self.column_type(column, rowid_alias));

        if rowid_alias {
            sql.push_str(" PRIMARY KEY AUTOINCREMENT");
        }
        if !column.allow_null {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            sql.push_str(&format!(" DEFAULT {}", default_literal(default)));
        }
        if column.data_type == "enum" {
            if let Some(values) = &column.enum_values {
                sql.push_str(&format!(" CHECK ({} IN ({}))", name, quote_values(values)));
            }
        }

        sql
    }

    fn create_index(&self, table_name: &str, index: &IndexDef) -> String {
        let unique = if index.kind == KeyKind::Unique { "UNIQUE " } else { "" };
        format!(
            "CREATE {}INDEX {} ON {} ({})",
            unique,
            self.quote(&index.name),
            self.quote(table_name),
            self.quote_list(&index.columns)
        )
    }
}

impl StructureDriver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn comparable(&self, column: &ColumnDescriptor) -> ColumnDescriptor {
        let mut column = column.clone();
        column.unsigned = false;
        if column.data_type == "set" {
            column.data_type = "text".to_string();
            column.enum_values = None;
        }
        if column.auto_increment {
            column.data_type = "int".to_string();
            column.length = None;
            column.precision = None;
        }
        if let Some(default) = &column.default {
            if default.eq_ignore_ascii_case("CURRENT_TIMESTAMP") {
                column.default = Some(default.to_uppercase());
            }
        }
        column
    }

    fn create_table(&self, table_name: &str, definition: &TableDefinition) -> Result<Vec<String>> {
        if definition.storage_engine.is_some() {
            return Err(self.unsupported("storage engines"));
        }

        let plan = plan_indexes(table_name, definition.iter());
        let rowid_alias = match plan.primary.as_slice() {
            [only] => definition
                .column(only)
                .filter(|column| column.auto_increment)
                .map(|column| column.name.clone()),
            _ => None,
        };

        let mut parts: Vec<String> = definition
            .iter()
            .map(|column| {
                let is_alias = rowid_alias.as_deref() == Some(column.name.as_str());
                format!("  {}", self.column_definition(column, is_alias))
            })
            .collect();

        if rowid_alias.is_none() && !plan.primary.is_empty() {
            parts.push(format!("  PRIMARY KEY ({})", self.quote_list(&plan.primary)));
        }

        let mut statements = vec![format!(
            "CREATE TABLE {} (\n{}\n)",
            self.quote(table_name),
            parts.join(",\n")
        )];
        statements.extend(
            plan.indexes
                .values()
                .map(|index| self.create_index(table_name, index)),
        );

        Ok(statements)
    }

    fn drop_table(&self, table_name: &str) -> Result<Vec<String>> {
        Ok(vec![format!("DROP TABLE IF EXISTS {}", self.quote(table_name))])
    }

    fn alter_table(&self, table_name: &str, diff: &TableDiff) -> Result<Vec<String>> {
        if diff.drop_primary_key || diff.primary_key_to_add.is_some() {
            return Err(self.unsupported("changing the primary key"));
        }
        if !diff.columns_to_alter.is_empty() {
            return Err(self.unsupported("modifying columns"));
        }
        if !diff.columns_to_drop.is_empty() {
            return Err(self.unsupported("dropping columns"));
        }
        if diff
            .columns_to_add
            .iter()
            .any(|column| !column.allow_null && column.default.is_none())
        {
            return Err(self.unsupported("adding a NOT NULL column without a default"));
        }

        let mut statements = Vec::new();
        for index in &diff.indexes_to_drop {
            statements.push(format!("DROP INDEX IF EXISTS {}", self.quote(&index.name)));
        }
        for column in &diff.columns_to_add {
            statements.push(format!(
                "ALTER TABLE {} ADD COLUMN {}",
                self.quote(table_name),
                self.column_definition(column, false)
            ));
        }
        for index in &diff.indexes_to_create {
            statements.push(self.create_index(table_name, index));
        }

        Ok(statements)
    }

    fn drop_column(&self, _table_name: &str, _column_name: &str) -> Result<Vec<String>> {
        Err(self.unsupported("dropping columns"))
    }

    fn rename_column(
        &self,
        table_name: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.quote(table_name),
            self.quote(old_name),
            self.quote(new_name)
        )])
    }

    fn rename_table(&self, old_name: &str, new_name: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} RENAME TO {}",
            self.quote(old_name),
            self.quote(new_name)
        )])
    }

    fn create_view(&self, view_name: &str, query: &str) -> Result<Vec<String>> {
        let view = self.quote(view_name);
        Ok(vec![
            format!("DROP VIEW IF EXISTS {}", view),
            format!("CREATE VIEW {} AS {}", view, query),
        ])
    }

    fn check_engine(&self, _engine: &str) -> Result<()> {
        Err(self.unsupported("storage engines"))
    }
}
