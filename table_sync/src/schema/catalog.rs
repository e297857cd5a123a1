//! Type catalog
//!
//! Static classification of the type names a table definition may use, and
//! the canonical rendering of a column's type.

use crate::schema::types::ColumnDescriptor;

const DATE: &[&str] = &["datetime", "date"];
const DECIMAL: &[&str] = &["decimal", "numeric"];
const FLOAT: &[&str] = &["float", "double"];
const INT: &[&str] = &["int", "tinyint", "smallint", "mediumint", "bigint"];
const STRING: &[&str] = &["varchar", "char", "mediumtext", "text"];
const LENGTH: &[&str] = &["varbinary"];
const OTHER: &[&str] = &["enum", "tinyblob", "blob", "mediumblob", "longblob", "ipaddress"];

/// A named group of related type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    Int,
    Float,
    Decimal,
    Numeric,
    String,
    Date,
    Length,
    Precision,
    Other,
    All,
}

impl TypeFamily {
    /// Parse a family name case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "int" => Some(TypeFamily::Int),
            "float" => Some(TypeFamily::Float),
            "decimal" => Some(TypeFamily::Decimal),
            "numeric" => Some(TypeFamily::Numeric),
            "string" => Some(TypeFamily::String),
            "date" => Some(TypeFamily::Date),
            "length" => Some(TypeFamily::Length),
            "precision" => Some(TypeFamily::Precision),
            "other" => Some(TypeFamily::Other),
            "all" => Some(TypeFamily::All),
            _ => None,
        }
    }

    /// The recognized type names in this family.
    pub fn members(self) -> Vec<&'static str> {
        let parts: &[&[&str]] = match self {
            TypeFamily::Int => &[INT],
            TypeFamily::Float => &[FLOAT],
            TypeFamily::Decimal | TypeFamily::Precision => &[DECIMAL],
            TypeFamily::Numeric => &[FLOAT, INT, DECIMAL],
            TypeFamily::String => &[STRING],
            TypeFamily::Date => &[DATE],
            TypeFamily::Length => &[STRING, LENGTH, DECIMAL],
            TypeFamily::Other => &[LENGTH, OTHER],
            TypeFamily::All => &[DATE, DECIMAL, FLOAT, INT, STRING, LENGTH, OTHER],
        };
        parts.iter().flat_map(|p| p.iter().copied()).collect()
    }

    pub fn contains(self, type_name: &str) -> bool {
        let lower = type_name.to_lowercase();
        self.members().iter().any(|t| *t == lower)
    }
}

/// Look up a family by name; unknown families are empty.
pub fn types_of(family: &str) -> Vec<&'static str> {
    TypeFamily::parse(family)
        .map(TypeFamily::members)
        .unwrap_or_default()
}

/// Whether a declared length means anything for this type.
///
/// Integer and floating point display widths are ignored.
pub fn length_applies(type_name: &str) -> bool {
    !TypeFamily::Int.contains(type_name) && !TypeFamily::Float.contains(type_name)
}

/// Map engine spellings of a type onto the catalog name.
pub fn canonical_type_name(type_name: &str) -> String {
    let lower = type_name.trim().to_lowercase();
    match lower.as_str() {
        "integer" => "int".to_string(),
        "double precision" => "double".to_string(),
        _ => lower,
    }
}

/// Build the canonical type-definition text for a column.
pub fn render_type_string(column: &ColumnDescriptor) -> String {
    let data_type = column.data_type.as_str();
    if data_type.is_empty() {
        return "int".to_string();
    }

    if let Some(values) = &column.enum_values {
        return format!("{}({})", data_type, quote_values(values));
    }

    let length = column.length.filter(|_| length_applies(data_type));
    match (length, column.precision) {
        (Some(length), Some(precision)) => format!("{}({},{})", data_type, length, precision),
        (Some(length), None) => format!("{}({})", data_type, length),
        _ => data_type.to_string(),
    }
}

/// Render a value list as comma separated SQL string literals.
pub fn quote_values(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(",")
}
