//! Utilities for table_sync
//!
//! This module provides utility functions used across the library.

pub mod logging;
pub mod naming;

// Re-export key utility functions
pub use naming::{format_sql_identifier, prefixed_table_name};
