//! Type definitions for table structure objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// One column's full intended (or observed) definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Lowercased base type name, or `enum` for value lists.
    pub data_type: String,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub enum_values: Option<Vec<String>>,
    pub allow_null: bool,
    pub default: Option<String>,
    pub key_type: KeyAssignment,
    pub unsigned: bool,
    /// Only ever set by `primary_key()`.
    pub auto_increment: bool,
}

/// The role a key tag gives a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    Primary,
    Key,
    Index,
    Unique,
    Fulltext,
}

impl KeyKind {
    /// Parse a tag prefix; unrecognized prefixes yield `None`.
    pub fn parse(prefix: &str) -> Option<Self> {
        match prefix {
            "primary" => Some(KeyKind::Primary),
            "key" => Some(KeyKind::Key),
            "index" => Some(KeyKind::Index),
            "unique" => Some(KeyKind::Unique),
            "fulltext" => Some(KeyKind::Fulltext),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyKind::Primary => "primary",
            KeyKind::Key => "key",
            KeyKind::Index => "index",
            KeyKind::Unique => "unique",
            KeyKind::Fulltext => "fulltext",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single classified key tag such as `index.ByDate`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyTag {
    pub kind: KeyKind,
    pub group: Option<String>,
}

impl KeyTag {
    pub fn new(kind: KeyKind) -> Self {
        Self { kind, group: None }
    }

    pub fn grouped(kind: KeyKind, group: impl Into<String>) -> Self {
        Self {
            kind,
            group: Some(group.into()),
        }
    }
}

impl fmt::Display for KeyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{}.{}", self.kind, group),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Normalized key membership of a column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAssignment {
    #[default]
    None,
    Single(KeyTag),
    Multiple(Vec<KeyTag>),
}

impl KeyAssignment {
    /// Collapse a tag list: zero tags is no key, one is stored alone.
    pub fn from_tags(mut tags: Vec<KeyTag>) -> Self {
        match tags.len() {
            0 => KeyAssignment::None,
            1 => KeyAssignment::Single(tags.remove(0)),
            _ => KeyAssignment::Multiple(tags),
        }
    }

    pub fn tags(&self) -> &[KeyTag] {
        match self {
            KeyAssignment::None => &[],
            KeyAssignment::Single(tag) => std::slice::from_ref(tag),
            KeyAssignment::Multiple(tags) => tags,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, KeyAssignment::None)
    }

    pub fn contains(&self, kind: KeyKind) -> bool {
        self.tags().iter().any(|tag| tag.kind == kind)
    }

    pub fn is_primary(&self) -> bool {
        self.contains(KeyKind::Primary)
    }

    /// Compare memberships ignoring tag order.
    pub fn same_membership(&self, other: &KeyAssignment) -> bool {
        let ours = self.tags();
        let theirs = other.tags();
        ours.len() == theirs.len() && ours.iter().all(|tag| theirs.contains(tag))
    }
}

/// The type half of a column definition.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    /// A type name, possibly `u`-prefixed and carrying `(length[,precision])`.
    Named {
        name: String,
        length: Option<u32>,
        precision: Option<u32>,
    },
    /// A plain `enum` of the given values.
    Enumerated(Vec<String>),
    /// A value-list type with an explicit type name, e.g. `set`.
    TypedEnumerated { type_name: String, values: Vec<String> },
}

impl TypeSpec {
    pub fn named(name: impl Into<String>, length: Option<u32>, precision: Option<u32>) -> Self {
        TypeSpec::Named {
            name: name.into(),
            length,
            precision,
        }
    }

    pub fn typed<I, S>(type_name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeSpec::TypedEnumerated {
            type_name: type_name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&str> for TypeSpec {
    fn from(name: &str) -> Self {
        TypeSpec::named(name, None, None)
    }
}

impl From<String> for TypeSpec {
    fn from(name: String) -> Self {
        TypeSpec::named(name, None, None)
    }
}

impl From<Vec<String>> for TypeSpec {
    fn from(values: Vec<String>) -> Self {
        TypeSpec::Enumerated(values)
    }
}

impl From<Vec<&str>> for TypeSpec {
    fn from(values: Vec<&str>) -> Self {
        TypeSpec::Enumerated(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for TypeSpec {
    fn from(values: &[&str]) -> Self {
        TypeSpec::Enumerated(values.iter().map(|v| v.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TypeSpec {
    fn from(values: [&str; N]) -> Self {
        TypeSpec::Enumerated(values.iter().map(|v| v.to_string()).collect())
    }
}

/// The nullability/default half of a column definition.
///
/// `true` maps to [`NullDefault::Nullable`], `false` to
/// [`NullDefault::NotNull`] and any other scalar to a NOT NULL column with
/// that value as its default.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NullDefault {
    #[default]
    Nullable,
    NotNull,
    Default(String),
    Explicit {
        null: bool,
        default: Option<String>,
    },
}

impl NullDefault {
    /// Split into `(allow_null, default)`.
    pub fn resolve(self) -> (bool, Option<String>) {
        match self {
            NullDefault::Nullable => (true, None),
            NullDefault::NotNull => (false, None),
            NullDefault::Default(value) => (false, Some(value)),
            NullDefault::Explicit { null, default } => (null, default),
        }
    }
}

impl From<bool> for NullDefault {
    fn from(nullable: bool) -> Self {
        if nullable {
            NullDefault::Nullable
        } else {
            NullDefault::NotNull
        }
    }
}

impl From<&str> for NullDefault {
    fn from(value: &str) -> Self {
        NullDefault::Default(value.to_string())
    }
}

impl From<String> for NullDefault {
    fn from(value: String) -> Self {
        NullDefault::Default(value)
    }
}

impl From<i32> for NullDefault {
    fn from(value: i32) -> Self {
        NullDefault::Default(value.to_string())
    }
}

impl From<i64> for NullDefault {
    fn from(value: i64) -> Self {
        NullDefault::Default(value.to_string())
    }
}

impl From<f64> for NullDefault {
    fn from(value: f64) -> Self {
        NullDefault::Default(value.to_string())
    }
}

/// Raw, unclassified key tags as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyTags(pub Vec<String>);

impl KeyTags {
    pub fn none() -> Self {
        KeyTags(Vec::new())
    }
}

impl From<&str> for KeyTags {
    fn from(tag: &str) -> Self {
        KeyTags(vec![tag.to_string()])
    }
}

impl From<String> for KeyTags {
    fn from(tag: String) -> Self {
        KeyTags(vec![tag])
    }
}

impl From<Vec<String>> for KeyTags {
    fn from(tags: Vec<String>) -> Self {
        KeyTags(tags)
    }
}

impl From<Vec<&str>> for KeyTags {
    fn from(tags: Vec<&str>) -> Self {
        KeyTags(tags.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for KeyTags {
    fn from(tags: &[&str]) -> Self {
        KeyTags(tags.iter().map(|t| t.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for KeyTags {
    fn from(tags: [&str; N]) -> Self {
        KeyTags(tags.iter().map(|t| t.to_string()).collect())
    }
}
