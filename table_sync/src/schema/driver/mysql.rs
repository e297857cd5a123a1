//! MySQL statement generation

use crate::error::{Error, Result};
use crate::schema::catalog::{render_type_string, TypeFamily};
use crate::schema::definition::TableDefinition;
use crate::schema::diff::TableDiff;
use crate::schema::driver::{default_literal, StructureDriver};
use crate::schema::keys::{plan_indexes, IndexDef};
use crate::schema::types::{ColumnDescriptor, KeyKind};

/// MySQL / MariaDB dialect. Supports every structure operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDriver;

impl MySqlDriver {
    /// Map catalog-only types onto MySQL column types.
    fn physical(&self, column: &ColumnDescriptor) -> ColumnDescriptor {
        let mut column = column.clone();
        if column.data_type == "ipaddress" {
            column.data_type = "varbinary".to_string();
            column.length = Some(16);
            column.precision = None;
        }
        column
    }

    fn column_definition(&self, column: &ColumnDescriptor) -> String {
        let column = self.physical(column);
        let mut sql = format!("{} {}", self.quote(&column.name), render_type_string(&column));

        if column.unsigned && TypeFamily::Numeric.contains(&column.data_type) {
            sql.push_str(" unsigned");
        }

        sql.push_str(if column.allow_null { " NULL" } else { " NOT NULL" });

        if let Some(default) = &column.default {
            sql.push_str(&format!(" DEFAULT {}", default_literal(default)));
        }

        if column.auto_increment {
            sql.push_str(" AUTO_INCREMENT");
        }

        sql
    }

    fn index_clause(&self, index: &IndexDef) -> String {
        let keyword = match index.kind {
            KeyKind::Unique => "UNIQUE KEY",
            KeyKind::Fulltext => "FULLTEXT KEY",
            _ => "KEY",
        };
        format!(
            "{} {} ({})",
            keyword,
            self.quote(&index.name),
            self.quote_list(&index.columns)
        )
    }
}

/// MySQL reports decimal defaults at the column's scale (`0` becomes `0.00`)
/// and float defaults in shortest form.
fn numeric_default(column: &ColumnDescriptor, default: &str) -> Option<String> {
    let value: f64 = default.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    if TypeFamily::Decimal.contains(&column.data_type) {
        let scale = column.precision.unwrap_or(0) as usize;
        Some(format!("{:.*}", scale, value))
    } else if TypeFamily::Float.contains(&column.data_type) {
        Some(value.to_string())
    } else {
        None
    }
}

impl StructureDriver for MySqlDriver {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn comparable(&self, column: &ColumnDescriptor) -> ColumnDescriptor {
        let mut column = self.physical(column);
        if !TypeFamily::Numeric.contains(&column.data_type) {
            column.unsigned = false;
        }
        if let Some(default) = &column.default {
            if default.eq_ignore_ascii_case("CURRENT_TIMESTAMP") {
                column.default = Some(default.to_uppercase());
            } else if let Some(numeric) = numeric_default(&column, default) {
                column.default = Some(numeric);
            }
        }
        column
    }

    fn create_table(&self, table_name: &str, definition: &TableDefinition) -> Result<Vec<String>> {
        let mut parts: Vec<String> = definition
            .iter()
            .map(|column| format!("  {}", self.column_definition(column)))
            .collect();

        let plan = plan_indexes(table_name, definition.iter());
        if !plan.primary.is_empty() {
            parts.push(format!("  PRIMARY KEY ({})", self.quote_list(&plan.primary)));
        }
        for index in plan.indexes.values() {
            parts.push(format!("  {}", self.index_clause(index)));
        }

        let mut sql = format!(
            "CREATE TABLE {} (\n{}\n)",
            self.quote(table_name),
            parts.join(",\n")
        );

        if let Some(engine) = &definition.storage_engine {
            self.check_engine(engine)?;
            sql.push_str(&format!(" ENGINE={}", engine));
        }
        if !definition.character_encoding.is_empty() {
            sql.push_str(&format!(
                " DEFAULT CHARACTER SET {}",
                definition.character_encoding
            ));
        }

        Ok(vec![sql])
    }

    fn drop_table(&self, table_name: &str) -> Result<Vec<String>> {
        Ok(vec![format!("DROP TABLE IF EXISTS {}", self.quote(table_name))])
    }

    fn alter_table(&self, table_name: &str, diff: &TableDiff) -> Result<Vec<String>> {
        let mut clauses = Vec::new();

        if diff.drop_primary_key {
            clauses.push("DROP PRIMARY KEY".to_string());
        }
        for index in &diff.indexes_to_drop {
            clauses.push(format!("DROP INDEX {}", self.quote(&index.name)));
        }

        for column in &diff.columns_to_add {
            clauses.push(format!("ADD COLUMN {}", self.column_definition(column)));
        }
        for change in &diff.columns_to_alter {
            clauses.push(format!(
                "CHANGE COLUMN {} {}",
                self.quote(&change.column_name),
                self.column_definition(&change.to)
            ));
        }
        for column_name in &diff.columns_to_drop {
            clauses.push(format!("DROP COLUMN {}", self.quote(column_name)));
        }

        if let Some(columns) = &diff.primary_key_to_add {
            clauses.push(format!("ADD PRIMARY KEY ({})", self.quote_list(columns)));
        }
        for index in &diff.indexes_to_create {
            clauses.push(format!("ADD {}", self.index_clause(index)));
        }

        if clauses.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![format!(
            "ALTER TABLE {}\n  {}",
            self.quote(table_name),
            clauses.join(",\n  ")
        )])
    }

    fn drop_column(&self, table_name: &str, column_name: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote(table_name),
            self.quote(column_name)
        )])
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
            "RENAME TABLE {} TO {}",
            self.quote(old_name),
            self.quote(new_name)
        )])
    }

    fn create_view(&self, view_name: &str, query: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "CREATE OR REPLACE VIEW {} AS {}",
            self.quote(view_name),
            query
        )])
    }

    fn check_engine(&self, engine: &str) -> Result<()> {
        let valid = !engine.is_empty()
            && engine.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(())
        } else {
            Err(Error::ConfigError(format!("Invalid storage engine: {:?}", engine)))
        }
    }
}
