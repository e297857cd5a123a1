//! Schema module for table_sync
//!
//! Column model, key classification, type catalog, the target and observed
//! table state, and the session that reconciles the two.

pub mod catalog;
pub mod column;
pub mod definition;
pub mod diff;
pub mod driver;
pub mod inspector;
pub mod keys;
pub mod structure;
pub mod types;

// Re-export key types
pub use definition::TableDefinition;
pub use diff::{ColumnChange, TableDiff};
pub use driver::{MySqlDriver, SqliteDriver, StructureDriver};
pub use structure::{SyncOutcome, TableStructure};
pub use types::{
    ColumnDescriptor, KeyAssignment, KeyKind, KeyTag, KeyTags, NullDefault, TypeSpec,
};
