//! Shared test doubles

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use indexmap::IndexMap;

use table_sync::schema::driver::StructureDriver;
use table_sync::{
    ColumnDescriptor, Error, Result, SchemaIntrospector, StatementExecutor, StructureConfig,
    TableStructure,
};

#[derive(Default)]
struct State {
    tables: IndexMap<String, IndexMap<String, ColumnDescriptor>>,
    executed: Vec<String>,
    table_queries: usize,
    fail_execute: bool,
}

/// An in-memory database that records statements without interpreting them.
///
/// Clones share state, so a test can keep a handle while a session owns
/// another.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<State>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `table` exists with `columns`.
    pub fn with_table(self, table: &str, columns: Vec<ColumnDescriptor>) -> Self {
        let columns = columns
            .into_iter()
            .map(|column| (column.name.clone(), column))
            .collect();
        self.state
            .lock()
            .unwrap()
            .tables
            .insert(table.to_string(), columns);
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.state.lock().unwrap().executed.clone()
    }

    /// How many times the existence of a table was asked.
    pub fn table_queries(&self) -> usize {
        self.state.lock().unwrap().table_queries
    }

    pub fn fail_execute(&self, fail: bool) {
        self.state.lock().unwrap().fail_execute = fail;
    }
}

#[async_trait]
impl StatementExecutor for MemoryDatabase {
    async fn execute(&self, sql: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_execute {
            return Err(Error::DatabaseError("server has gone away".to_string()));
        }
        state.executed.push(sql.to_string());
        Ok(())
    }
}

#[async_trait]
impl SchemaIntrospector for MemoryDatabase {
    async fn fetch_tables(&self, table_name: &str) -> Result<Vec<String>> {
        let mut state = self.state.lock().unwrap();
        state.table_queries += 1;
        Ok(state
            .tables
            .keys()
            .filter(|name| name.as_str() == table_name)
            .cloned()
            .collect())
    }

    async fn fetch_table_schema(
        &self,
        table_name: &str,
    ) -> Result<IndexMap<String, ColumnDescriptor>> {
        let state = self.state.lock().unwrap();
        Ok(state.tables.get(table_name).cloned().unwrap_or_default())
    }
}

pub fn structure_config() -> StructureConfig {
    StructureConfig {
        table_prefix: "GDN_".to_string(),
        character_encoding: "utf8mb4".to_string(),
        capture_only: false,
        storage_engine: None,
    }
}

/// A session over `database` with the `GDN_` prefix.
pub fn session(
    database: &MemoryDatabase,
    driver: Box<dyn StructureDriver>,
) -> TableStructure<MemoryDatabase> {
    TableStructure::new(database.clone(), driver, structure_config())
}

/// The columns of the `User` table used across tests.
pub fn user_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::primary("UserID", "int"),
        ColumnDescriptor::define("Name", "varchar(50)", false, "index"),
        ColumnDescriptor::define("Email", "varchar(100)", false, "unique"),
        ColumnDescriptor::define("DateInserted", "datetime", false, "index.ByDate"),
    ]
}

/// Define the `User` table on a session.
pub fn define_user(structure: &mut TableStructure<MemoryDatabase>) {
    structure
        .table("User", None)
        .primary_key("UserID", "int")
        .column("Name", "varchar(50)", false, "index")
        .column("Email", "varchar(100)", false, "unique")
        .column("DateInserted", "datetime", false, "index.ByDate");
}
