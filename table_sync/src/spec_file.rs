//! Table definition files
//!
//! A table definition can be kept in a TOML, YAML or JSON file and applied to
//! a [`TableStructure`] session. The format is picked from the extension.
//!
//! ```yaml
//! table: User
//! columns:
//!   - name: UserID
//!     type: int
//!     primary_key: true
//!   - name: Status
//!     type: [active, banned]
//!     default: active
//!   - name: DateInserted
//!     type: datetime
//!     nullable: false
//!     key: [index.ByDate]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::schema::structure::TableStructure;
use crate::schema::types::{ColumnDescriptor, KeyTags, NullDefault, TypeSpec};

/// One table as described in a definition file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpecFile {
    pub table: String,
    #[serde(default)]
    pub character_encoding: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    pub columns: Vec<ColumnSpec>,
}

/// One column entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_spec: Option<TypeField>,
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub default: Option<ScalarValue>,
    #[serde(default)]
    pub key: Option<KeyField>,
    #[serde(default)]
    pub primary_key: bool,
}

/// `type`: a type name, a list of enum values, or a `[type, values]` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeField {
    Named(String),
    Typed(String, Vec<String>),
    Values(Vec<String>),
}

/// A default value as written in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ScalarValue {
    fn to_sql_value(&self) -> String {
        match self {
            ScalarValue::Bool(value) => (if *value { "1" } else { "0" }).to_string(),
            ScalarValue::Integer(value) => value.to_string(),
            ScalarValue::Float(value) => value.to_string(),
            ScalarValue::Text(value) => value.clone(),
        }
    }
}

/// `key`: one tag or a list of tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyField {
    One(String),
    Many(Vec<String>),
}

impl From<&TypeField> for TypeSpec {
    fn from(field: &TypeField) -> Self {
        match field {
            TypeField::Named(name) => TypeSpec::from(name.as_str()),
            TypeField::Typed(type_name, values) => TypeSpec::typed(type_name.clone(), values.clone()),
            TypeField::Values(values) => TypeSpec::Enumerated(values.clone()),
        }
    }
}

impl ColumnSpec {
    fn type_spec(&self) -> TypeSpec {
        self.type_spec
            .as_ref()
            .map(TypeSpec::from)
            .unwrap_or_else(|| TypeSpec::from("int"))
    }

    /// Nullability and default. Without a default a column is nullable
    /// unless stated otherwise; with one it is not null unless stated.
    fn null_default(&self) -> NullDefault {
        match &self.default {
            Some(value) => NullDefault::Explicit {
                null: self.nullable.unwrap_or(false),
                default: Some(value.to_sql_value()),
            },
            None => NullDefault::from(self.nullable.unwrap_or(true)),
        }
    }

    fn key_tags(&self) -> KeyTags {
        match &self.key {
            Some(KeyField::One(tag)) => KeyTags::from(tag.as_str()),
            Some(KeyField::Many(tags)) => KeyTags::from(tags.clone()),
            None => KeyTags::none(),
        }
    }

    /// Resolve the entry into a column descriptor.
    pub fn to_descriptor(&self) -> ColumnDescriptor {
        if self.primary_key {
            return ColumnDescriptor::primary(self.name.clone(), self.type_spec());
        }
        ColumnDescriptor::define(
            self.name.clone(),
            self.type_spec(),
            self.null_default(),
            self.key_tags(),
        )
    }
}

impl TableSpecFile {
    /// Load a definition file, choosing the format by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_lowercase();

        match extension.as_str() {
            "toml" => Ok(toml::from_str(&contents)?),
            "yaml" | "yml" => Ok(serde_yaml::from_str(&contents)?),
            "json" => Ok(serde_json::from_str(&contents)?),
            other => Err(Error::ConfigError(format!(
                "Unsupported definition file extension: {:?}",
                other
            ))),
        }
    }

    /// Define this table on a session
    pub fn apply<D: Database>(&self, structure: &mut TableStructure<D>) -> Result<()> {
        structure.table(&self.table, self.character_encoding.as_deref());
        if let Some(engine) = &self.engine {
            structure.engine(engine)?;
        }

        for column in &self.columns {
            if column.primary_key {
                structure.primary_key(&column.name, column.type_spec());
            } else {
                structure.column(
                    &column.name,
                    column.type_spec(),
                    column.null_default(),
                    column.key_tags(),
                );
            }
        }

        Ok(())
    }
}
