//! Eager-load join descriptions.
//!
//! An [`IncludeSpec`] names a to-one relation to fetch in the same row
//! stream as its parent via a LEFT OUTER JOIN. Joined result sets alias
//! every column as `table__column` so the two sides never collide.

use hydrate_core::{Entity, FieldInfo, Related};

/// A to-one relation loaded through a LEFT OUTER JOIN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeSpec {
    /// Relation name on the parent.
    pub relation: &'static str,
    /// Table joined in.
    pub related_table: &'static str,
    /// Foreign key column on the parent.
    pub local_key: &'static str,
    /// Key column on the related table.
    pub remote_key: &'static str,
}

impl IncludeSpec {
    /// Describe the relation declared by `R`.
    ///
    /// The local key is the first parent column whose foreign key points at
    /// the related table; the remote key is the related primary key.
    #[must_use]
    pub fn for_relation<R: Related>() -> Self {
        let related_table = <R::Target as Entity>::TABLE_NAME;
        let local_key = R::fields()
            .iter()
            .find(|f| {
                f.foreign_key
                    .is_some_and(|fk| fk.split('.').next() == Some(related_table))
            })
            .map_or("id", |f| f.column_name);
        let remote_key = primary_key_column(<R::Target as Entity>::fields());
        Self {
            relation: R::RELATION,
            related_table,
            local_key,
            remote_key,
        }
    }
}

fn primary_key_column(fields: &[FieldInfo]) -> &'static str {
    fields
        .iter()
        .find(|f| f.primary_key)
        .map_or("id", |f| f.column_name)
}

/// Generate aliased column names for one table.
#[must_use]
pub fn build_aliased_column_parts(table_name: &str, fields: &[FieldInfo]) -> Vec<String> {
    fields.iter().map(|f| f.alias(table_name)).collect()
}

/// Column names of a joined row: root columns followed by related columns.
#[must_use]
pub fn joined_column_names<R: Related>() -> Vec<String> {
    let mut names = build_aliased_column_parts(R::TABLE_NAME, R::fields());
    names.extend(build_aliased_column_parts(
        <R::Target as Entity>::TABLE_NAME,
        <R::Target as Entity>::fields(),
    ));
    names
}
