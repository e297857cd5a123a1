//! Table structure session
//!
//! [`TableStructure`] is the object callers drive: name a table, define its
//! columns, then [`synchronize`](TableStructure::synchronize) to create or
//! alter the live table to match. One session handles one table at a time
//! and is reused for the next table after [`reset`](TableStructure::reset).

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::StructureConfig;
use crate::db::{Database, SqlExecutor};
use crate::error::{Error, Result};
use crate::schema::catalog::{render_type_string, types_of};
use crate::schema::definition::{find_column, TableDefinition};
use crate::schema::diff::TableDiff;
use crate::schema::driver::StructureDriver;
use crate::schema::inspector::{query_table_exists, ObservedState};
use crate::schema::types::{ColumnDescriptor, KeyTags, NullDefault, TypeSpec};
use crate::utils::naming::prefixed_table_name;

/// What a successful [`TableStructure::synchronize`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    /// The table was dropped and created again.
    Recreated,
    Modified,
    /// The table already matched its definition.
    Unchanged,
}

/// A schema synchronization session bound to one database connection.
pub struct TableStructure<D> {
    config: StructureConfig,
    driver: Box<dyn StructureDriver>,
    executor: SqlExecutor<D>,
    definition: TableDefinition,
    observed: ObservedState,
}

impl<D: Database> TableStructure<D> {
    pub fn new(connection: D, driver: Box<dyn StructureDriver>, config: StructureConfig) -> Self {
        let mut executor = SqlExecutor::new(connection);
        executor.set_capture_only(config.capture_only);

        let mut structure = Self {
            config,
            driver,
            executor,
            definition: TableDefinition::default(),
            observed: ObservedState::default(),
        };
        structure.definition.storage_engine = structure.default_engine();
        structure
    }

    /// The configured storage engine, if the driver accepts one.
    fn default_engine(&self) -> Option<String> {
        let engine = self.config.storage_engine.as_ref()?;
        match self.driver.check_engine(engine) {
            Ok(()) => Some(engine.clone()),
            Err(error) => {
                debug!(engine = %engine, error = %error, "Ignoring configured storage engine");
                None
            }
        }
    }

    /// Start defining `name`.
    ///
    /// Without an encoding the configured default is used. Columns already
    /// defined are kept; call [`reset`](Self::reset) to start over.
    pub fn table(&mut self, name: &str, character_encoding: Option<&str>) -> &mut Self {
        self.definition.name = name.to_string();
        self.definition.character_encoding = character_encoding
            .unwrap_or(&self.config.character_encoding)
            .to_string();
        self
    }

    pub fn table_name(&self) -> &str {
        &self.definition.name
    }

    /// The table name as the database knows it, prefix included.
    pub fn physical_table_name(&self) -> String {
        prefixed_table_name(&self.config.table_prefix, &self.definition.name)
    }

    pub fn character_encoding(&self) -> &str {
        &self.definition.character_encoding
    }

    pub fn definition(&self) -> &TableDefinition {
        &self.definition
    }

    /// Choose the storage engine used when the table is created.
    pub fn engine(&mut self, engine: &str) -> Result<&mut Self> {
        self.driver.check_engine(engine)?;
        self.definition.storage_engine = Some(engine.to_string());
        Ok(self)
    }

    /// Define a column, replacing any column with the same name.
    pub fn column(
        &mut self,
        name: &str,
        type_spec: impl Into<TypeSpec>,
        null_default: impl Into<NullDefault>,
        key_type: impl Into<KeyTags>,
    ) -> &mut Self {
        self.definition
            .set_column(ColumnDescriptor::define(name, type_spec, null_default, key_type));
        self
    }

    /// Define the auto-incrementing primary key column.
    pub fn primary_key(&mut self, name: &str, type_spec: impl Into<TypeSpec>) -> &mut Self {
        self.definition
            .set_column(ColumnDescriptor::primary(name, type_spec));
        self
    }

    /// All target columns in definition order.
    pub fn columns(&self) -> &IndexMap<String, ColumnDescriptor> {
        &self.definition.columns
    }

    /// One target column, matched case-insensitively.
    pub fn column_named(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.definition.column(name)
    }

    /// The type definition text of a target column.
    pub fn column_type_string(&self, name: &str) -> Option<String> {
        self.definition.column(name).map(render_type_string)
    }

    /// Type names in a catalog family.
    pub fn types(family: &str) -> Vec<&'static str> {
        types_of(family)
    }

    pub fn table_prefix(&self) -> &str {
        &self.config.table_prefix
    }

    pub fn set_table_prefix(&mut self, prefix: &str) -> &mut Self {
        self.config.table_prefix = prefix.to_string();
        self
    }

    /// Record statements instead of executing them.
    pub fn capture_only(&mut self, capture_only: bool) -> &mut Self {
        self.executor.set_capture_only(capture_only);
        self
    }

    pub fn is_capturing(&self) -> bool {
        self.executor.is_capturing()
    }

    pub fn captured_sql(&self) -> &[String] {
        self.executor.captured_sql()
    }

    pub fn take_captured_sql(&mut self) -> Vec<String> {
        self.executor.take_captured_sql()
    }

    pub fn connection(&self) -> &D {
        self.executor.connection()
    }

    /// Whether the current table exists. Cached until [`reset`](Self::reset).
    pub async fn table_exists(&mut self) -> Result<bool> {
        let table_name = self.physical_table_name();
        self.observed.focus(&table_name);

        if let Some(exists) = self.observed.table_exists {
            return Ok(exists);
        }

        let exists = query_table_exists(self.executor.connection(), &table_name).await?;
        self.observed.table_exists = Some(exists);
        Ok(exists)
    }

    /// Whether the logical table `name` exists.
    ///
    /// Always asks the database. The answer is only cached when `name` is the
    /// current table.
    pub async fn table_exists_named(&mut self, name: &str) -> Result<bool> {
        let table_name = prefixed_table_name(&self.config.table_prefix, name);
        let exists = query_table_exists(self.executor.connection(), &table_name).await?;

        if name == self.definition.name {
            self.observed.focus(&table_name);
            self.observed.table_exists = Some(exists);
        }
        Ok(exists)
    }

    /// The live columns of the current table; empty if it does not exist.
    pub async fn existing_columns(&mut self) -> Result<&IndexMap<String, ColumnDescriptor>> {
        let table_name = self.physical_table_name();
        self.observed.focus(&table_name);

        if self.observed.existing_columns.is_none() {
            let columns = if self.table_exists().await? {
                self.executor
                    .connection()
                    .fetch_table_schema(&table_name)
                    .await?
            } else {
                IndexMap::new()
            };
            self.observed.existing_columns = Some(columns);
        }

        let columns: &IndexMap<String, ColumnDescriptor> =
            self.observed.existing_columns.get_or_insert_with(IndexMap::new);
        Ok(columns)
    }

    /// Whether the live table has a column called `name`, ignoring case.
    pub async fn column_exists(&mut self, name: &str) -> Result<bool> {
        let columns = self.existing_columns().await?;
        Ok(find_column(columns, name).is_some())
    }

    /// Load the live schema of `table` (or the current table) as the target.
    pub async fn get(&mut self, table: Option<&str>) -> Result<&mut Self> {
        if let Some(name) = table {
            self.table(name, None);
        }

        let columns = self
            .executor
            .connection()
            .fetch_table_schema(&self.physical_table_name())
            .await?;
        self.definition.columns = columns;
        Ok(self)
    }

    /// Create or alter the live table to match the definition.
    ///
    /// With `explicit`, live columns missing from the definition are dropped.
    /// With `drop`, an existing table is dropped and created from scratch.
    /// Any failure resets the session before the error is returned.
    pub async fn synchronize(&mut self, explicit: bool, drop: bool) -> Result<SyncOutcome> {
        match self.try_synchronize(explicit, drop).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                warn!(
                    table = %self.definition.name,
                    error = %error,
                    "Synchronization failed, resetting structure"
                );
                self.reset();
                Err(error)
            }
        }
    }

    async fn try_synchronize(&mut self, explicit: bool, drop: bool) -> Result<SyncOutcome> {
        if self.definition.name.is_empty() {
            return Err(Error::ConfigError(
                "You must specify a table before calling synchronize()".to_string(),
            ));
        }
        if self.definition.is_empty() {
            return Err(Error::ConfigError(
                "You must provide at least one column before calling synchronize()".to_string(),
            ));
        }

        if !self.table_exists().await? {
            info!(table = %self.physical_table_name(), mode = "create", "Synchronizing table");
            self.create().await?;
            return Ok(SyncOutcome::Created);
        }

        if drop {
            info!(table = %self.physical_table_name(), mode = "recreate", "Synchronizing table");
            self.drop_table().await?;
            self.create().await?;
            return Ok(SyncOutcome::Recreated);
        }

        info!(
            table = %self.physical_table_name(),
            mode = "modify",
            explicit,
            "Synchronizing table"
        );
        self.modify(explicit).await
    }

    async fn create(&mut self) -> Result<()> {
        let table_name = self.physical_table_name();
        let statements = self.driver.create_table(&table_name, &self.definition)?;
        self.executor.query_batch(&statements).await?;

        if !self.executor.is_capturing() {
            self.observed.focus(&table_name);
            self.observed.record(self.definition.columns.clone());
        }
        Ok(())
    }

    async fn modify(&mut self, explicit: bool) -> Result<SyncOutcome> {
        let table_name = self.physical_table_name();
        let existing = self.existing_columns().await?.clone();

        let diff = TableDiff::generate(
            &table_name,
            &self.definition,
            &existing,
            explicit,
            self.driver.as_ref(),
        );
        if diff.is_empty() {
            info!(table = %table_name, "Table is already in sync");
            return Ok(SyncOutcome::Unchanged);
        }

        let statements = self.driver.alter_table(&table_name, &diff)?;
        self.executor.query_batch(&statements).await?;

        if !self.executor.is_capturing() {
            let columns = diff.apply(&table_name, &self.definition, &existing);
            self.observed.record(columns);
        }
        Ok(SyncOutcome::Modified)
    }

    /// Drop the current table.
    pub async fn drop_table(&mut self) -> Result<()> {
        let table_name = self.physical_table_name();
        let statements = self.driver.drop_table(&table_name)?;
        self.executor.query_batch(&statements).await?;

        if !self.executor.is_capturing() {
            self.observed.focus(&table_name);
            self.observed.table_exists = Some(false);
            self.observed.existing_columns = Some(IndexMap::new());
        }
        Ok(())
    }

    /// Drop one column of the current table.
    pub async fn drop_column(&mut self, name: &str) -> Result<()> {
        let table_name = self.physical_table_name();
        let statements = self.driver.drop_column(&table_name, name)?;
        self.executor.query_batch(&statements).await?;

        if !self.executor.is_capturing() {
            if let Some(columns) = self.observed.existing_columns.as_mut() {
                columns.retain(|column_name, _| !column_name.eq_ignore_ascii_case(name));
            }
        }
        Ok(())
    }

    /// Rename a column of the current table.
    pub async fn rename_column(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let table_name = self.physical_table_name();
        let statements = self.driver.rename_column(&table_name, old_name, new_name)?;
        self.executor.query_batch(&statements).await?;

        if !self.executor.is_capturing() {
            self.observed.existing_columns = None;
        }
        Ok(())
    }

    /// Rename a table. With `use_prefix` both names get the table prefix.
    pub async fn rename_table(
        &mut self,
        old_name: &str,
        new_name: &str,
        use_prefix: bool,
    ) -> Result<()> {
        let (old_name, new_name) = if use_prefix {
            (
                prefixed_table_name(&self.config.table_prefix, old_name),
                prefixed_table_name(&self.config.table_prefix, new_name),
            )
        } else {
            (old_name.to_string(), new_name.to_string())
        };

        let statements = self.driver.rename_table(&old_name, &new_name)?;
        self.executor.query_batch(&statements).await?;

        if !self.executor.is_capturing() {
            self.observed.clear();
        }
        Ok(())
    }

    /// Create or replace the view `name` (prefix applied) over `query`.
    pub async fn view(&mut self, name: &str, query: &str) -> Result<()> {
        let view_name = prefixed_table_name(&self.config.table_prefix, name);
        let statements = self.driver.create_view(&view_name, query)?;
        self.executor.query_batch(&statements).await
    }

    /// Forget the current table, its columns and everything observed about it.
    pub fn reset(&mut self) -> &mut Self {
        self.definition = TableDefinition::default();
        self.definition.storage_engine = self.default_engine();
        self.observed.clear();
        self
    }
}
