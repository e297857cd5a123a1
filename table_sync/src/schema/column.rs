//! Column model
//!
//! Resolves a caller's type, nullability and key input into a single
//! canonical [`ColumnDescriptor`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::catalog::canonical_type_name;
use crate::schema::keys::classify;
use crate::schema::types::{ColumnDescriptor, KeyAssignment, KeyTags, NullDefault, TypeSpec};

static TYPE_WITH_LENGTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\w+)\s*\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\)").expect("static regex")
});

static QUOTED_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'((?:[^']|'')*)'").expect("static regex"));

/// A type string split into its parts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedType {
    pub data_type: String,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub unsigned: bool,
}

/// Split a raw type string such as `udecimal(10,2)` into its parts.
///
/// A leading `u` marks the type unsigned; a bare `u` leaves the type empty.
/// A length or precision that does not parse is dropped rather than reported.
pub fn parse_type_string(raw: &str) -> ParsedType {
    let mut rest = raw.trim();
    let mut unsigned = false;

    if rest.as_bytes().first().map_or(false, |b| b.eq_ignore_ascii_case(&b'u')) {
        rest = &rest[1..];
        unsigned = true;
    }

    split_type(rest, unsigned)
}

fn split_type(rest: &str, unsigned: bool) -> ParsedType {
    if let Some(captures) = TYPE_WITH_LENGTH.captures(rest) {
        let length = captures.get(2).and_then(|m| m.as_str().parse().ok());
        let precision = captures.get(3).and_then(|m| m.as_str().parse().ok());
        return ParsedType {
            data_type: canonical_type_name(&captures[1]),
            length,
            precision: precision.filter(|_| length.is_some()),
            unsigned,
        };
    }

    let base = rest.split('(').next().unwrap_or(rest);
    ParsedType {
        data_type: canonical_type_name(base),
        length: None,
        precision: None,
        unsigned,
    }
}

/// Parse the value list of an engine-reported `enum('a','b')` type.
pub fn parse_enum_values(column_type: &str) -> Option<(String, Vec<String>)> {
    let open = column_type.find('(')?;
    let close = column_type.rfind(')')?;
    if close <= open {
        return None;
    }

    let type_name = canonical_type_name(&column_type[..open]);
    if type_name != "enum" && type_name != "set" {
        return None;
    }

    let values = QUOTED_VALUE
        .captures_iter(&column_type[open + 1..close])
        .map(|c| c[1].replace("''", "'"))
        .collect();
    Some((type_name, values))
}

/// Strip the quoting some engines put around a reported default.
///
/// MariaDB reports a missing default as the bare word `NULL`; that maps to
/// `None`, while a quoted `'NULL'` stays a string default.
pub fn reported_default(raw: &str) -> Option<String> {
    if raw.trim().eq_ignore_ascii_case("null") {
        return None;
    }
    Some(unquote_default(raw))
}

/// Remove one level of single quotes from a default.
pub fn unquote_default(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        return trimmed[1..trimmed.len() - 1].replace("''", "'");
    }
    trimmed.to_string()
}

impl ColumnDescriptor {
    /// Resolve a column definition into a descriptor.
    pub fn define(
        name: impl Into<String>,
        type_spec: impl Into<TypeSpec>,
        null_default: impl Into<NullDefault>,
        key_type: impl Into<KeyTags>,
    ) -> Self {
        let key_tags = key_type.into();
        Self::with_keys(name, type_spec, null_default, classify(&key_tags.0))
    }

    /// Resolve a column definition whose keys are already classified.
    pub fn with_keys(
        name: impl Into<String>,
        type_spec: impl Into<TypeSpec>,
        null_default: impl Into<NullDefault>,
        key_type: KeyAssignment,
    ) -> Self {
        let (allow_null, default) = null_default.into().resolve();

        let mut column = Self {
            name: name.into(),
            data_type: String::new(),
            length: None,
            precision: None,
            enum_values: None,
            allow_null,
            default,
            key_type,
            unsigned: false,
            auto_increment: false,
        };

        match type_spec.into() {
            TypeSpec::Named {
                name,
                length,
                precision,
            } => {
                let parsed = parse_type_string(&name);
                column.data_type = parsed.data_type;
                column.length = length.or(parsed.length);
                column.precision = precision.or(parsed.precision);
                column.unsigned = parsed.unsigned;
            }
            TypeSpec::Enumerated(values) => {
                column.data_type = "enum".to_string();
                column.enum_values = Some(values);
            }
            TypeSpec::TypedEnumerated { type_name, values } => {
                column.data_type = canonical_type_name(&type_name);
                column.enum_values = Some(values);
            }
        }

        // A column without a type is an int.
        if column.data_type.is_empty() {
            column.data_type = "int".to_string();
        }

        column
    }

    /// The auto-incrementing, not-null primary key column.
    pub fn primary(name: impl Into<String>, type_spec: impl Into<TypeSpec>) -> Self {
        let mut column = Self::define(name, type_spec, NullDefault::NotNull, "primary");
        column.auto_increment = true;
        column
    }

    /// Build a descriptor from what the database reports for a column.
    ///
    /// `column_type` is the engine's own spelling, e.g. `int(10) unsigned` or
    /// `enum('a','b')`.
    pub fn from_reported(
        name: impl Into<String>,
        column_type: &str,
        allow_null: bool,
        default: Option<String>,
        key_type: KeyAssignment,
    ) -> Self {
        let lower = column_type.trim().to_lowercase();
        let unsigned = lower.split_whitespace().skip(1).any(|word| word == "unsigned");

        let type_spec = match parse_enum_values(column_type) {
            Some((type_name, values)) if type_name == "enum" => TypeSpec::Enumerated(values),
            Some((type_name, values)) => TypeSpec::TypedEnumerated { type_name, values },
            None => {
                let base = lower.split_whitespace().next().unwrap_or_default();
                TypeSpec::named(base, None, None)
            }
        };

        let null_default = NullDefault::Explicit {
            null: allow_null,
            default: default.as_deref().and_then(reported_default),
        };

        let mut column = Self::with_keys(name, type_spec, null_default, key_type);
        if column.enum_values.is_none() {
            let parsed = split_type(lower.split_whitespace().next().unwrap_or_default(), unsigned);
            column.data_type = parsed.data_type;
            column.length = parsed.length;
            column.precision = parsed.precision;
        }
        column.unsigned = unsigned;
        column
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{KeyKind, KeyTag};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_plain_and_qualified() {
        assert_eq!(
            parse_type_string("decimal(10,2)"),
            ParsedType {
                data_type: "decimal".to_string(),
                length: Some(10),
                precision: Some(2),
                unsigned: false,
            }
        );
        assert_eq!(
            parse_type_string("varchar( 50 )"),
            ParsedType {
                data_type: "varchar".to_string(),
                length: Some(50),
                precision: None,
                unsigned: false,
            }
        );
        assert_eq!(parse_type_string("TEXT").data_type, "text");
    }

    #[test]
    fn test_parse_unsigned_prefix() {
        let parsed = parse_type_string("UInt(10)");
        assert!(parsed.unsigned);
        assert_eq!(parsed.data_type, "int");
        assert_eq!(parsed.length, Some(10));

        let bare = parse_type_string("u");
        assert!(bare.unsigned);
        assert_eq!(bare.data_type, "");
    }

    #[test]
    fn test_malformed_length_is_omitted() {
        let parsed = parse_type_string("varchar(abc)");
        assert_eq!(parsed.data_type, "varchar");
        assert_eq!(parsed.length, None);

        let overflow = parse_type_string("varchar(99999999999999)");
        assert_eq!(overflow.data_type, "varchar");
        assert_eq!(overflow.length, None);
        assert_eq!(overflow.precision, None);
    }

    #[test]
    fn test_engine_reported_types() {
        let parsed = parse_type_string("int(11) unsigned");
        assert_eq!(parsed.data_type, "int");
        assert_eq!(parsed.length, Some(11));
        assert_eq!(parse_type_string("INTEGER").data_type, "int");
    }

    #[test]
    fn test_parse_enum_values() {
        assert_eq!(
            parse_enum_values("enum('open','it''s closed')"),
            Some((
                "enum".to_string(),
                vec!["open".to_string(), "it's closed".to_string()]
            ))
        );
        assert_eq!(
            parse_enum_values("set('a')"),
            Some(("set".to_string(), vec!["a".to_string()]))
        );
        assert_eq!(parse_enum_values("varchar(20)"), None);
    }

    #[test]
    fn test_define_named_column() {
        let column = ColumnDescriptor::define("Amount", "decimal(10,2)", false, KeyTags::none());
        assert_eq!(column.data_type, "decimal");
        assert_eq!(column.length, Some(10));
        assert_eq!(column.precision, Some(2));
        assert!(!column.allow_null);
        assert_eq!(column.default, None);
        assert!(column.key_type.is_none());
        assert!(!column.auto_increment);
    }

    #[test]
    fn test_explicit_length_wins() {
        let column = ColumnDescriptor::define(
            "Name",
            TypeSpec::named("varchar(20)", Some(100), None),
            true,
            KeyTags::none(),
        );
        assert_eq!(column.length, Some(100));
    }

    #[test]
    fn test_define_enum_and_set() {
        let status = ColumnDescriptor::define("Status", ["a", "b"], "a", KeyTags::none());
        assert_eq!(status.data_type, "enum");
        assert_eq!(status.enum_values, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(status.default, Some("a".to_string()));

        let shape = ColumnDescriptor::define(
            "Shape",
            TypeSpec::typed("set", ["Short", "Tall"]),
            true,
            KeyTags::none(),
        );
        assert_eq!(shape.data_type, "set");
        assert_eq!(shape.enum_values.map(|v| v.len()), Some(2));
    }

    #[test]
    fn test_primary_column() {
        let column = ColumnDescriptor::primary("UserID", "int");
        assert!(column.auto_increment);
        assert!(!column.allow_null);
        assert_eq!(column.key_type, KeyAssignment::Single(KeyTag::new(KeyKind::Primary)));
    }

    #[test]
    fn test_from_reported_mysql_types() {
        let id = ColumnDescriptor::from_reported(
            "UserID",
            "int(10) unsigned",
            false,
            None,
            KeyAssignment::Single(KeyTag::new(KeyKind::Primary)),
        );
        assert_eq!(id.data_type, "int");
        assert_eq!(id.length, Some(10));
        assert!(id.unsigned);
        assert!(!id.allow_null);

        let status = ColumnDescriptor::from_reported(
            "Status",
            "enum('open','closed')",
            false,
            Some("open".to_string()),
            KeyAssignment::None,
        );
        assert_eq!(status.data_type, "enum");
        assert_eq!(status.enum_values, Some(vec!["open".to_string(), "closed".to_string()]));
        assert_eq!(status.default, Some("open".to_string()));
    }

    #[test]
    fn test_from_reported_does_not_read_u_prefix() {
        // Engine spellings never carry the unsigned prefix.
        let column = ColumnDescriptor::from_reported("Url", "url(255)", true, None, KeyAssignment::None);
        assert_eq!(column.data_type, "url");
        assert_eq!(column.length, Some(255));
        assert!(!column.unsigned);
    }

    #[test]
    fn test_unquote_default() {
        assert_eq!(unquote_default("'it''s'"), "it's");
        assert_eq!(unquote_default("0"), "0");
        assert_eq!(unquote_default("CURRENT_TIMESTAMP"), "CURRENT_TIMESTAMP");
    }

    #[test]
    fn test_missing_type_resolves_to_int() {
        let hits = ColumnDescriptor::define("Hits", "", true, KeyTags::none());
        assert_eq!(hits.data_type, "int");
        assert!(!hits.unsigned);

        let counter = ColumnDescriptor::define("Counter", "u", false, KeyTags::none());
        assert_eq!(counter.data_type, "int");
        assert!(counter.unsigned);
    }

    #[test]
    fn test_reported_null_default() {
        assert_eq!(reported_default("NULL"), None);
        assert_eq!(reported_default("null"), None);
        assert_eq!(reported_default("'NULL'"), Some("NULL".to_string()));
        assert_eq!(reported_default("'0'"), Some("0".to_string()));

        let body = ColumnDescriptor::from_reported(
            "Body",
            "text",
            true,
            Some("NULL".to_string()),
            KeyAssignment::None,
        );
        assert_eq!(body.default, None);

        let label = ColumnDescriptor::from_reported(
            "Label",
            "varchar(20)",
            true,
            Some("'NULL'".to_string()),
            KeyAssignment::None,
        );
        assert_eq!(label.default.as_deref(), Some("NULL"));
    }

    #[test]
    fn test_is_named_ignores_case() {
        let column = ColumnDescriptor::define("Email", "varchar(100)", true, KeyTags::none());
        assert!(column.is_named("email"));
        assert!(!column.is_named("mail"));
    }
}
