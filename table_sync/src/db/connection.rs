//! Database connection handling
//!
//! This module provides functionality to establish and manage database
//! connections, and implements statement execution and schema introspection
//! for every supported engine.

use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use sqlx::{
    mysql::MySqlPoolOptions, sqlite::SqlitePoolOptions, Executor, FromRow, MySql, Pool, Row,
    Sqlite,
};
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::db::{SchemaIntrospector, StatementExecutor};
use crate::error::{Error, Result};
use crate::schema::driver::{self, StructureDriver};
use crate::schema::keys::tag_from_index_name;
use crate::schema::types::{ColumnDescriptor, KeyAssignment, KeyKind, KeyTag};
use crate::utils::naming::format_sql_identifier;

/// Enumeration of supported database types
#[derive(Debug, Clone)]
pub enum DatabaseConnection {
    MySql(Pool<MySql>),
    Sqlite(Pool<Sqlite>),
}

impl DatabaseConnection {
    /// Create a new database connection from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool_size = config.pool_size.unwrap_or(10);
        let timeout = Duration::from_secs(config.timeout_seconds.unwrap_or(30));

        match config.driver.as_str() {
            "mysql" => {
                let pool = MySqlPoolOptions::new()
                    .max_connections(pool_size)
                    .acquire_timeout(timeout)
                    .connect(&config.url)
                    .await?;

                Ok(DatabaseConnection::MySql(pool))
            }
            "sqlite" => {
                let pool = SqlitePoolOptions::new()
                    .max_connections(pool_size)
                    .acquire_timeout(timeout)
                    .connect(&config.url)
                    .await?;

                Ok(DatabaseConnection::Sqlite(pool))
            }
            _ => Err(Error::ConfigError(format!(
                "Unsupported database driver: {}",
                config.driver
            ))),
        }
    }

    /// Engine name as used in configuration
    pub fn driver_name(&self) -> &'static str {
        match self {
            DatabaseConnection::MySql(_) => "mysql",
            DatabaseConnection::Sqlite(_) => "sqlite",
        }
    }

    /// The SQL dialect matching this connection
    pub fn structure_driver(&self) -> Result<Box<dyn StructureDriver>> {
        driver::for_name(self.driver_name())
    }
}

#[async_trait]
impl StatementExecutor for DatabaseConnection {
    async fn execute(&self, sql: &str) -> Result<()> {
        match self {
            DatabaseConnection::MySql(pool) => {
                pool.execute(sql).await?;
            }
            DatabaseConnection::Sqlite(pool) => {
                pool.execute(sql).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SchemaIntrospector for DatabaseConnection {
    async fn fetch_tables(&self, table_name: &str) -> Result<Vec<String>> {
        let rows = match self {
            DatabaseConnection::MySql(pool) => {
                let sql = r#"
                    SELECT CAST(table_name AS CHAR) AS table_name
                    FROM information_schema.tables
                    WHERE table_schema = DATABASE() AND table_name = ?
                "#;
                sqlx::query_as::<_, TableRow>(sql)
                    .bind(table_name)
                    .fetch_all(pool)
                    .await?
            }
            DatabaseConnection::Sqlite(pool) => {
                let sql = r#"SELECT name AS table_name FROM sqlite_master WHERE type = 'table' AND name = ?"#;
                sqlx::query_as::<_, TableRow>(sql)
                    .bind(table_name)
                    .fetch_all(pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(|row| row.table_name).collect())
    }

    async fn fetch_table_schema(
        &self,
        table_name: &str,
    ) -> Result<IndexMap<String, ColumnDescriptor>> {
        debug!(table = %table_name, "Fetching table schema");
        match self {
            DatabaseConnection::MySql(pool) => MySqlIntrospector { pool }.columns(table_name).await,
            DatabaseConnection::Sqlite(pool) => {
                SqliteIntrospector { pool }.columns(table_name).await
            }
        }
    }
}

#[derive(FromRow)]
struct TableRow {
    table_name: String,
}

#[derive(FromRow)]
struct MySqlColumnRow {
    column_name: String,
    column_type: String,
    is_nullable: String,
    column_default: Option<String>,
    extra: String,
}

#[derive(FromRow)]
struct MySqlIndexRow {
    index_name: String,
    column_name: Option<String>,
}

/// Collect key tags per column from `(index name, column)` pairs.
fn tags_by_column(
    table_name: &str,
    entries: impl IntoIterator<Item = (String, String)>,
) -> IndexMap<String, Vec<KeyTag>> {
    let mut tags: IndexMap<String, Vec<KeyTag>> = IndexMap::new();

    for (index_name, column_name) in entries {
        let tag = if index_name == "PRIMARY" {
            Some(KeyTag::new(KeyKind::Primary))
        } else {
            tag_from_index_name(table_name, &index_name, &column_name)
        };

        if let Some(tag) = tag {
            tags.entry(column_name.to_lowercase()).or_default().push(tag);
        }
    }

    tags
}

struct MySqlIntrospector<'a> {
    pool: &'a Pool<MySql>,
}

impl<'a> MySqlIntrospector<'a> {
    async fn columns(&self, table_name: &str) -> Result<IndexMap<String, ColumnDescriptor>> {
        let sql = r#"
            SELECT
                CAST(column_name AS CHAR) AS column_name,
                CAST(column_type AS CHAR) AS column_type,
                CAST(is_nullable AS CHAR) AS is_nullable,
                CAST(column_default AS CHAR) AS column_default,
                CAST(extra AS CHAR) AS extra
            FROM information_schema.columns
            WHERE table_schema = DATABASE() AND table_name = ?
            ORDER BY ordinal_position
        "#;

        let column_rows = sqlx::query_as::<_, MySqlColumnRow>(sql)
            .bind(table_name)
            .fetch_all(self.pool)
            .await?;

        let sql = r#"
            SELECT
                CAST(index_name AS CHAR) AS index_name,
                CAST(column_name AS CHAR) AS column_name
            FROM information_schema.statistics
            WHERE table_schema = DATABASE() AND table_name = ?
            ORDER BY index_name, seq_in_index
        "#;

        let index_rows = sqlx::query_as::<_, MySqlIndexRow>(sql)
            .bind(table_name)
            .fetch_all(self.pool)
            .await?;

        let mut tags = tags_by_column(
            table_name,
            index_rows
                .into_iter()
                .filter_map(|row| Some((row.index_name, row.column_name?))),
        );

        let mut columns = IndexMap::new();
        for row in column_rows {
            let key_type = KeyAssignment::from_tags(
                tags.shift_remove(&row.column_name.to_lowercase())
                    .unwrap_or_default(),
            );
            let mut column = ColumnDescriptor::from_reported(
                row.column_name.clone(),
                &row.column_type,
                row.is_nullable.eq_ignore_ascii_case("YES"),
                row.column_default,
                key_type,
            );
            column.auto_increment = row.extra.to_lowercase().contains("auto_increment");
            columns.insert(row.column_name, column);
        }

        Ok(columns)
    }
}

struct SqliteIntrospector<'a> {
    pool: &'a Pool<Sqlite>,
}

impl<'a> SqliteIntrospector<'a> {
    async fn columns(&self, table_name: &str) -> Result<IndexMap<String, ColumnDescriptor>> {
        let quoted = format_sql_identifier(table_name, "sqlite");

        let mut pairs = Vec::new();
        let pragma = format!("PRAGMA index_list({})", quoted);
        for index in sqlx::query(&pragma).fetch_all(self.pool).await? {
            let index_name: String = index.try_get("name")?;
            let pragma = format!(
                "PRAGMA index_info({})",
                format_sql_identifier(&index_name, "sqlite")
            );
            for part in sqlx::query(&pragma).fetch_all(self.pool).await? {
                let column_name: Option<String> = part.try_get("name")?;
                if let Some(column_name) = column_name {
                    pairs.push((index_name.clone(), column_name));
                }
            }
        }
        let mut tags = tags_by_column(table_name, pairs);

        let pragma = format!("PRAGMA table_info({})", quoted);
        let rows = sqlx::query(&pragma).fetch_all(self.pool).await?;

        let mut columns = IndexMap::new();
        for col in rows {
            let name: String = col.try_get("name")?;
            let data_type: String = col.try_get("type")?;
            let notnull: i64 = col.try_get("notnull")?;
            let dflt_value: Option<String> = col.try_get("dflt_value")?;
            let pk: i64 = col.try_get("pk")?;

            let mut key_tags = tags.shift_remove(&name.to_lowercase()).unwrap_or_default();
            if pk > 0 {
                key_tags.insert(0, KeyTag::new(KeyKind::Primary));
            }

            let mut column = ColumnDescriptor::from_reported(
                name.clone(),
                &data_type,
                notnull == 0,
                dflt_value,
                KeyAssignment::from_tags(key_tags),
            );
            // A rowid alias is the only way SQLite auto-increments.
            column.auto_increment = pk > 0 && data_type.eq_ignore_ascii_case("integer");
            columns.insert(name, column);
        }

        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tags_by_column_skips_foreign_indexes() {
        let tags = tags_by_column(
            "GDN_User",
            vec![
                ("PRIMARY".to_string(), "UserID".to_string()),
                ("UX_GDN_User".to_string(), "Email".to_string()),
                ("idx_legacy".to_string(), "Email".to_string()),
                ("IX_GDN_User_ByDate".to_string(), "DateInserted".to_string()),
            ],
        );

        assert_eq!(tags["userid"], vec![KeyTag::new(KeyKind::Primary)]);
        assert_eq!(tags["email"], vec![KeyTag::new(KeyKind::Unique)]);
        assert_eq!(
            tags["dateinserted"],
            vec![KeyTag::grouped(KeyKind::Index, "ByDate")]
        );
    }

    #[tokio::test]
    async fn test_unsupported_driver_is_config_error() {
        let config = DatabaseConfig {
            driver: "postgres".to_string(),
            url: "postgres://localhost/db".to_string(),
            pool_size: None,
            timeout_seconds: None,
        };
        let error = DatabaseConnection::connect(&config).await.unwrap_err();
        assert!(matches!(error, Error::ConfigError(_)));
    }
}
