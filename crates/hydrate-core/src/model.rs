//! Entity traits for positional row mapping.
//!
//! An [`Entity`] maps one table onto a struct by column position. A
//! [`Related`] entity additionally carries one eagerly loaded reference to
//! another entity, filled in by the join resolver.

use std::sync::Arc;

use crate::Result;
use crate::error::{Error, MalformedRowError, MalformedRowKind};
use crate::field::FieldInfo;
use crate::row::FromValue;
use crate::value::Value;

/// A materialized instance.
///
/// Tracked sessions hand out clones of the same `Arc` for one key; untracked
/// sessions allocate a new one per occurrence.
pub type EntityRef<M> = Arc<M>;

/// Trait for types that map to a database table.
pub trait Entity: Sized + Send + Sync + 'static {
    /// The name of the database table.
    const TABLE_NAME: &'static str;

    /// Ordered column contract for this entity.
    fn fields() -> &'static [FieldInfo];

    /// Build an instance from this entity's columns, in `fields()` order.
    fn from_columns(columns: &[Value]) -> Result<Self>;

    /// The primary key of this instance.
    fn primary_key(&self) -> i64;

    /// Number of columns this entity occupies in a flat row.
    fn column_count() -> usize {
        Self::fields().len()
    }
}

/// An entity with one eagerly loaded to-one relation.
pub trait Related: Entity {
    /// The entity on the other side of the relation.
    type Target: Entity;

    /// Relation name, for diagnostics.
    const RELATION: &'static str;

    /// Foreign key pointing at the target, if any.
    fn foreign_key(&self) -> Option<i64>;

    /// Set the loaded reference.
    fn attach(&mut self, target: Option<EntityRef<Self::Target>>);

    /// The loaded reference, if present.
    fn related(&self) -> Option<&EntityRef<Self::Target>>;
}

/// Decode column `index` of `M` from a positional slice.
///
/// Decode failures are reported as [`MalformedRowKind::Column`] naming the
/// offending column.
pub fn decode_column<M: Entity, T: FromValue>(columns: &[Value], index: usize) -> Result<T> {
    let fields = M::fields();
    let (Some(field), Some(value)) = (fields.get(index), columns.get(index)) else {
        return Err(Error::MalformedRow(MalformedRowError {
            table: M::TABLE_NAME,
            kind: MalformedRowKind::Arity {
                expected: fields.len(),
                actual: columns.len(),
            },
        }));
    };

    T::from_value(value).map_err(|e| match e {
        Error::Type(te) => Error::MalformedRow(MalformedRowError {
            table: M::TABLE_NAME,
            kind: MalformedRowKind::Column {
                column: field.column_name,
                expected: field.sql_type.sql_name(),
                actual: te.actual,
            },
        }),
        other => other,
    })
}
