//! Field and column definitions.

use crate::types::SqlType;

/// Metadata about a mapped column.
///
/// An entity's `fields()` slice is the positional column contract: the
/// materializer reads columns in exactly this order.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Rust field name
    pub name: &'static str,
    /// Database column name (may differ from field name)
    pub column_name: &'static str,
    /// SQL type for this field
    pub sql_type: SqlType,
    /// Whether this field is nullable
    pub nullable: bool,
    /// Whether this is the primary key
    pub primary_key: bool,
    /// Foreign key reference (table.column)
    pub foreign_key: Option<&'static str>,
}

impl FieldInfo {
    /// Create a new field info with minimal required data.
    pub const fn new(name: &'static str, column_name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            column_name,
            sql_type,
            nullable: false,
            primary_key: false,
            foreign_key: None,
        }
    }

    /// Set nullable flag.
    pub const fn nullable(mut self, value: bool) -> Self {
        self.nullable = value;
        self
    }

    /// Set primary key flag.
    pub const fn primary_key(mut self, value: bool) -> Self {
        self.primary_key = value;
        self
    }

    /// Set foreign key reference.
    pub const fn foreign_key(mut self, reference: &'static str) -> Self {
        self.foreign_key = Some(reference);
        self
    }

    /// Column alias used in joined result sets (`table__column`).
    pub fn alias(&self, table: &str) -> String {
        format!("{}__{}", table, self.column_name)
    }
}
