//! Table difference calculator
//!
//! Compares the target definition of one table with what the database
//! reports and works out the column and index changes that would bring the
//! table in line.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::schema::catalog::length_applies;
use crate::schema::definition::{find_column, TableDefinition};
use crate::schema::driver::StructureDriver;
use crate::schema::keys::{index_name, plan_indexes, IndexDef, IndexPlan};
use crate::schema::types::{ColumnDescriptor, KeyAssignment, KeyKind};

/// Represents changes needed to synchronize one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableDiff {
    pub columns_to_add: Vec<ColumnDescriptor>,
    pub columns_to_alter: Vec<ColumnChange>,
    pub columns_to_drop: Vec<String>,
    pub drop_primary_key: bool,
    pub primary_key_to_add: Option<Vec<String>>,
    pub indexes_to_drop: Vec<IndexDef>,
    pub indexes_to_create: Vec<IndexDef>,
}

/// Represents a column change
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChange {
    /// Name of the column as the database reports it.
    pub column_name: String,
    pub from: ColumnDescriptor,
    pub to: ColumnDescriptor,
}

fn same_columns(left: &[String], right: &[String]) -> bool {
    let lower = |names: &[String]| -> HashSet<String> {
        names.iter().map(|name| name.to_lowercase()).collect()
    };
    left.len() == right.len() && lower(left) == lower(right)
}

fn indexes_by_name(plan: &IndexPlan) -> IndexMap<String, &IndexDef> {
    plan.indexes
        .values()
        .map(|index| (index.name.to_lowercase(), index))
        .collect()
}

impl TableDiff {
    /// Generate the diff between the target definition and the existing columns
    ///
    /// Existing columns missing from the target are dropped only when
    /// `explicit` is set. Keys that cover only columns of the target are
    /// always brought in line; keys that touch other columns are left alone
    /// unless `explicit` is set.
    pub fn generate(
        table_name: &str,
        target: &TableDefinition,
        existing: &IndexMap<String, ColumnDescriptor>,
        explicit: bool,
        driver: &dyn StructureDriver,
    ) -> Self {
        let mut diff = TableDiff::default();

        for column in target.iter() {
            match find_column(existing, &column.name) {
                None => diff.columns_to_add.push(column.clone()),
                Some(current) => {
                    if Self::column_needs_alteration(
                        &driver.comparable(current),
                        &driver.comparable(column),
                    ) {
                        diff.columns_to_alter.push(ColumnChange {
                            column_name: current.name.clone(),
                            from: current.clone(),
                            to: column.clone(),
                        });
                    }
                }
            }
        }

        if explicit {
            diff.columns_to_drop = existing
                .values()
                .filter(|column| !target.column_exists(&column.name))
                .map(|column| column.name.clone())
                .collect();
        }

        let target_plan = plan_indexes(table_name, target.iter());
        let current_plan = plan_indexes(table_name, existing.values());
        let managed = |columns: &[String]| {
            explicit || columns.iter().all(|column| target.column_exists(column))
        };

        if !same_columns(&target_plan.primary, &current_plan.primary) {
            if !target_plan.primary.is_empty() {
                diff.drop_primary_key = !current_plan.primary.is_empty();
                diff.primary_key_to_add = Some(target_plan.primary.clone());
            } else if managed(&current_plan.primary) {
                diff.drop_primary_key = true;
            }
        }

        let wanted = indexes_by_name(&target_plan);
        let current = indexes_by_name(&current_plan);

        for (name, index) in &current {
            match wanted.get(name) {
                Some(target_index)
                    if target_index.kind == index.kind
                        && same_columns(&target_index.columns, &index.columns) => {}
                Some(_) => diff.indexes_to_drop.push((*index).clone()),
                None if managed(&index.columns) => diff.indexes_to_drop.push((*index).clone()),
                None => {}
            }
        }

        for (name, index) in &wanted {
            let unchanged = current.get(name).map_or(false, |current_index| {
                current_index.kind == index.kind
                    && same_columns(&current_index.columns, &index.columns)
            });
            if !unchanged {
                diff.indexes_to_create.push((*index).clone());
            }
        }

        diff
    }

    /// Check if a column needs to be altered
    ///
    /// A length or precision is only compared when the target declares one
    /// that means something for its type. Enumerated values are only compared
    /// when both sides know them.
    fn column_needs_alteration(current: &ColumnDescriptor, target: &ColumnDescriptor) -> bool {
        // Type different
        if !current.data_type.eq_ignore_ascii_case(&target.data_type) {
            return true;
        }

        if length_applies(&target.data_type) {
            if target.length.is_some() && current.length != target.length {
                return true;
            }
            if target.precision.is_some() && current.precision != target.precision {
                return true;
            }
        }

        if let (Some(current_values), Some(target_values)) =
            (&current.enum_values, &target.enum_values)
        {
            if current_values != target_values {
                return true;
            }
        }

        // Nullability different
        if current.allow_null != target.allow_null {
            return true;
        }

        // Default value different
        if current.default != target.default {
            return true;
        }

        current.unsigned != target.unsigned || current.auto_increment != target.auto_increment
    }

    /// Check if the diff is empty (no changes needed)
    pub fn is_empty(&self) -> bool {
        self.columns_to_add.is_empty()
            && self.columns_to_alter.is_empty()
            && self.columns_to_drop.is_empty()
            && !self.drop_primary_key
            && self.primary_key_to_add.is_none()
            && self.indexes_to_drop.is_empty()
            && self.indexes_to_create.is_empty()
    }

    /// The columns the table has once this diff has been applied to `existing`.
    pub fn apply(
        &self,
        table_name: &str,
        target: &TableDefinition,
        existing: &IndexMap<String, ColumnDescriptor>,
    ) -> IndexMap<String, ColumnDescriptor> {
        let mut result = IndexMap::new();

        for (name, column) in existing {
            if self.columns_to_drop.iter().any(|dropped| dropped.eq_ignore_ascii_case(name)) {
                continue;
            }
            match target.column(name) {
                Some(wanted) => result.insert(wanted.name.clone(), wanted.clone()),
                None => result.insert(name.clone(), column.clone()),
            };
        }

        for column in &self.columns_to_add {
            result.insert(column.name.clone(), column.clone());
        }

        // Columns outside the definition keep only the keys that survived.
        let dropped: HashSet<String> = self
            .indexes_to_drop
            .iter()
            .map(|index| index.name.to_lowercase())
            .collect();
        for column in result.values_mut().filter(|c| !target.column_exists(&c.name)) {
            let tags = column
                .key_type
                .tags()
                .iter()
                .filter(|tag| match tag.kind {
                    KeyKind::Primary => !self.drop_primary_key,
                    _ => !dropped.contains(&index_name(table_name, tag, &column.name).to_lowercase()),
                })
                .cloned()
                .collect();
            column.key_type = KeyAssignment::from_tags(tags);
        }

        result
    }
}
