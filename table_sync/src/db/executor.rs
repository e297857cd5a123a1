//! SQL executor
//!
//! Every statement the synchronizer issues passes through [`SqlExecutor`].
//! In capture mode statements are appended to the captured log instead of
//! reaching the database, and reported as successful.

use tracing::debug;

use crate::db::StatementExecutor;
use crate::error::Result;

/// SQL executor for running or capturing statements
pub struct SqlExecutor<D> {
    connection: D,
    capture_only: bool,
    captured_sql: Vec<String>,
}

impl<D: StatementExecutor> SqlExecutor<D> {
    /// Create a new SQL executor
    pub fn new(connection: D) -> Self {
        Self {
            connection,
            capture_only: false,
            captured_sql: Vec::new(),
        }
    }

    pub fn set_capture_only(&mut self, capture_only: bool) {
        self.capture_only = capture_only;
    }

    pub fn is_capturing(&self) -> bool {
        self.capture_only
    }

    /// Execute a single SQL statement, or capture it
    pub async fn query(&mut self, sql: &str) -> Result<()> {
        if self.capture_only {
            debug!(sql = %sql, "Capturing SQL");
            self.captured_sql.push(sql.to_string());
            return Ok(());
        }

        debug!(sql = %sql, "Executing SQL");
        self.connection.execute(sql).await
    }

    /// Execute multiple SQL statements in order
    pub async fn query_batch(&mut self, statements: &[String]) -> Result<()> {
        for statement in statements {
            self.query(statement).await?;
        }

        Ok(())
    }

    /// Statements captured so far, oldest first
    pub fn captured_sql(&self) -> &[String] {
        &self.captured_sql
    }

    pub fn take_captured_sql(&mut self) -> Vec<String> {
        std::mem::take(&mut self.captured_sql)
    }

    /// Get database connection
    pub fn connection(&self) -> &D {
        &self.connection
    }
}
