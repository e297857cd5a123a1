//! Naming utilities for table_sync
//!
//! Identifier quoting, table prefixes and capture file names.

use chrono::Utc;

/// Apply the configured table prefix to a logical table name
pub fn prefixed_table_name(prefix: &str, table_name: &str) -> String {
    format!("{}{}", prefix, table_name)
}

/// Format SQL identifier according to database style
///
/// Embedded quote characters are doubled.
pub fn format_sql_identifier(name: &str, db_type: &str) -> String {
    match db_type.to_lowercase().as_str() {
        "mysql" => format!("`{}`", name.replace('`', "``")),
        "sqlite" => format!("\"{}\"", name.replace('"', "\"\"")),
        _ => name.to_string(),
    }
}

/// Quote and join a column list
pub fn format_identifier_list(names: &[String], db_type: &str) -> String {
    names
        .iter()
        .map(|name| format_sql_identifier(name, db_type))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a value as a SQL string literal
pub fn format_sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Format name as a valid file name
pub fn format_file_name(name: &str) -> String {
    name.replace(
        |c: char| matches!(c, ' ' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'),
        "_",
    )
    .to_lowercase()
}

/// Create a timestamp-based capture file name
pub fn create_capture_name(description: &str, timestamp: bool) -> String {
    let clean_description = format_file_name(description);

    if timestamp {
        let now = Utc::now();
        format!("{}_{}", now.format("%Y%m%d%H%M%S"), clean_description)
    } else {
        clean_description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_table_name() {
        assert_eq!(prefixed_table_name("GDN_", "User"), "GDN_User");
        assert_eq!(prefixed_table_name("", "User"), "User");
    }

    #[test]
    fn test_format_sql_identifier() {
        assert_eq!(format_sql_identifier("User", "mysql"), "`User`");
        assert_eq!(format_sql_identifier("we`ird", "MySQL"), "`we``ird`");
        assert_eq!(format_sql_identifier("User", "sqlite"), "\"User\"");
        assert_eq!(format_sql_identifier("a\"b", "sqlite"), "\"a\"\"b\"");
    }

    #[test]
    fn test_format_identifier_list() {
        let names = vec!["DateInserted".to_string(), "DateUpdated".to_string()];
        assert_eq!(
            format_identifier_list(&names, "mysql"),
            "`DateInserted`, `DateUpdated`"
        );
    }

    #[test]
    fn test_format_sql_literal() {
        assert_eq!(format_sql_literal("it's"), "'it''s'");
    }

    #[test]
    fn test_capture_name() {
        assert_eq!(create_capture_name("GDN User", false), "gdn_user");

        let stamped = create_capture_name("GDN_User", true);
        assert!(stamped.ends_with("_gdn_user"));
        assert_eq!(stamped.len(), "20260101120000_gdn_user".len());
    }
}
