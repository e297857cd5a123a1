//! Key classification and index planning
//!
//! Raw key tags (`primary`, `index.ByDate`, ...) are classified into a
//! [`KeyAssignment`] per column. The columns of a table are then grouped into
//! named indexes the same way for the target definition and for what the
//! database reports, so the two can be compared by index name.

use indexmap::IndexMap;

use crate::schema::types::{ColumnDescriptor, KeyAssignment, KeyKind, KeyTag};

/// Classify raw key tags.
///
/// Each tag is `prefix` or `prefix.group`. Unrecognized prefixes and empty
/// tags are dropped silently; the order of the remaining tags is kept.
pub fn classify<S: AsRef<str>>(raw_tags: &[S]) -> KeyAssignment {
    let tags = raw_tags
        .iter()
        .filter_map(|raw| {
            let raw = raw.as_ref().trim();
            let (prefix, group) = match raw.split_once('.') {
                Some((prefix, group)) => (prefix, Some(group)),
                None => (raw, None),
            };

            let kind = KeyKind::parse(prefix)?;
            Some(KeyTag {
                kind,
                group: group.filter(|g| !g.is_empty()).map(str::to_string),
            })
        })
        .collect();

    KeyAssignment::from_tags(tags)
}

/// One secondary index of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub name: String,
    pub kind: KeyKind,
    pub columns: Vec<String>,
}

/// Every key of a table grouped by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexPlan {
    pub primary: Vec<String>,
    pub indexes: IndexMap<String, IndexDef>,
}

fn index_prefix(kind: KeyKind) -> &'static str {
    match kind {
        KeyKind::Primary => "PK",
        KeyKind::Key => "FK",
        KeyKind::Index => "IX",
        KeyKind::Unique => "UX",
        KeyKind::Fulltext => "TX",
    }
}

/// Name of the index a tag places `column` in.
///
/// Ungrouped `key` and `index` tags get one index per column; ungrouped
/// `unique` and `fulltext` columns share one index per table.
pub fn index_name(table: &str, tag: &KeyTag, column: &str) -> String {
    let prefix = index_prefix(tag.kind);
    match (&tag.group, tag.kind) {
        (Some(group), _) => format!("{}_{}_{}", prefix, table, group),
        (None, KeyKind::Key | KeyKind::Index) => format!("{}_{}_{}", prefix, table, column),
        (None, _) => format!("{}_{}", prefix, table),
    }
}

/// Map an index name produced by [`index_name`] back to a key tag.
///
/// Returns `None` for names this crate did not generate.
pub fn tag_from_index_name(table: &str, index: &str, column: &str) -> Option<KeyTag> {
    let (prefix, rest) = index.split_once('_')?;
    let kind = match prefix {
        "FK" => KeyKind::Key,
        "IX" => KeyKind::Index,
        "UX" => KeyKind::Unique,
        "TX" => KeyKind::Fulltext,
        _ => return None,
    };

    let suffix = rest.strip_prefix(table)?;
    if suffix.is_empty() {
        return match kind {
            KeyKind::Unique | KeyKind::Fulltext => Some(KeyTag::new(kind)),
            _ => None,
        };
    }

    let group = suffix.strip_prefix('_')?;
    if group.is_empty() {
        return None;
    }
    if matches!(kind, KeyKind::Key | KeyKind::Index) && group.eq_ignore_ascii_case(column) {
        return Some(KeyTag::new(kind));
    }
    Some(KeyTag::grouped(kind, group))
}

/// Group the key tags of `columns` into the indexes of `table`.
pub fn plan_indexes<'a, I>(table: &str, columns: I) -> IndexPlan
where
    I: IntoIterator<Item = &'a ColumnDescriptor>,
{
    let mut plan = IndexPlan::default();

    for column in columns {
        for tag in column.key_type.tags() {
            if tag.kind == KeyKind::Primary {
                if !plan.primary.contains(&column.name) {
                    plan.primary.push(column.name.clone());
                }
                continue;
            }

            let name = index_name(table, tag, &column.name);
            let index = plan.indexes.entry(name.clone()).or_insert_with(|| IndexDef {
                name,
                kind: tag.kind,
                columns: Vec::new(),
            });
            if !index.columns.contains(&column.name) {
                index.columns.push(column.name.clone());
            }
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{KeyTags, NullDefault};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_keeps_input_order_and_drops_bogus() {
        assert_eq!(
            classify(&["primary", "index.ByDate", "bogus"]),
            KeyAssignment::Multiple(vec![
                KeyTag::new(KeyKind::Primary),
                KeyTag::grouped(KeyKind::Index, "ByDate"),
            ])
        );
    }

    #[test]
    fn test_classify_shapes() {
        let empty: [&str; 0] = [];
        assert_eq!(classify(&empty), KeyAssignment::None);
        assert_eq!(classify(&["", "nope.Group"]), KeyAssignment::None);
        assert_eq!(
            classify(&["unique"]),
            KeyAssignment::Single(KeyTag::new(KeyKind::Unique))
        );
        assert_eq!(
            classify(&["fulltext.Body"]),
            KeyAssignment::Single(KeyTag::grouped(KeyKind::Fulltext, "Body"))
        );
        // Only the first dot separates the group.
        assert_eq!(
            classify(&["key.a.b"]),
            KeyAssignment::Single(KeyTag::grouped(KeyKind::Key, "a.b"))
        );
    }

    fn column(name: &str, keys: &[&str]) -> ColumnDescriptor {
        ColumnDescriptor::define(name, "int", NullDefault::NotNull, KeyTags::from(keys))
    }

    #[test]
    fn test_plan_indexes() {
        let columns = vec![
            column("UserID", &["primary"]),
            column("Name", &["index"]),
            column("Email", &["unique"]),
            column("Login", &["unique"]),
            column("DateInserted", &["index.ByDate", "key"]),
            column("DateUpdated", &["index.ByDate"]),
        ];

        let plan = plan_indexes("GDN_User", &columns);
        assert_eq!(plan.primary, vec!["UserID".to_string()]);

        let names: Vec<&str> = plan.indexes.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "IX_GDN_User_Name",
                "UX_GDN_User",
                "IX_GDN_User_ByDate",
                "FK_GDN_User_DateInserted",
            ]
        );
        assert_eq!(
            plan.indexes["UX_GDN_User"].columns,
            vec!["Email".to_string(), "Login".to_string()]
        );
        assert_eq!(
            plan.indexes["IX_GDN_User_ByDate"].columns,
            vec!["DateInserted".to_string(), "DateUpdated".to_string()]
        );
    }

    #[test]
    fn test_index_names_map_back_to_tags() {
        let cases = [
            (KeyTag::new(KeyKind::Index), "Name"),
            (KeyTag::new(KeyKind::Key), "RoleID"),
            (KeyTag::new(KeyKind::Unique), "Email"),
            (KeyTag::new(KeyKind::Fulltext), "Body"),
            (KeyTag::grouped(KeyKind::Index, "ByDate"), "DateInserted"),
            (KeyTag::grouped(KeyKind::Unique, "Slug"), "Slug2"),
        ];

        for (tag, column) in cases {
            let name = index_name("GDN_Post", &tag, column);
            assert_eq!(tag_from_index_name("GDN_Post", &name, column), Some(tag));
        }
    }

    #[test]
    fn test_foreign_index_names_are_ignored() {
        assert_eq!(tag_from_index_name("GDN_Post", "idx_post_date", "Date"), None);
        assert_eq!(tag_from_index_name("GDN_Post", "IX_GDN_Other_Date", "Date"), None);
        assert_eq!(tag_from_index_name("GDN_Post", "IX_GDN_Post", "Date"), None);
    }
}
