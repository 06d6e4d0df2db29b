//! Row-to-entity materialization.
//!
//! A joined row carries the root entity's columns followed by the related
//! entity's columns. When the outer join found no match every related column
//! is NULL and no related instance is built.
//!
//! Decoding is positional. Rows that also carry `table__column` names must
//! match the expected layout name for name.

use hydrate_core::{Entity, Error, MalformedRowError, MalformedRowKind, Related, Result, Row};

/// Number of columns a joined row for `R` must carry.
pub fn expected_arity<R: Related>() -> usize {
    R::column_count() + <R::Target as Entity>::column_count()
}

/// Build the root instance and, when present, the related instance from one
/// joined row.
///
/// The root's related reference is left unset; attaching it is the
/// resolver's job.
pub fn materialize_row<R: Related>(row: &Row) -> Result<(R, Option<R::Target>)> {
    let expected = expected_arity::<R>();
    if row.len() != expected {
        return Err(Error::MalformedRow(MalformedRowError {
            table: R::TABLE_NAME,
            kind: MalformedRowKind::Arity {
                expected,
                actual: row.len(),
            },
        }));
    }

    check_column_names::<R>(row)?;

    let (root_cols, related_cols) = row.as_slice().split_at(R::column_count());
    let root = R::from_columns(root_cols)?;

    let related = if related_cols.iter().all(|v| v.is_null()) {
        None
    } else {
        Some(<R::Target as Entity>::from_columns(related_cols)?)
    };

    Ok((root, related))
}

/// Compare a named row against `R`'s aliased root and related columns.
///
/// Positional rows carry no names and pass unchecked.
fn check_column_names<R: Related>(row: &Row) -> Result<()> {
    let names = row.column_names();
    if names.is_empty() {
        return Ok(());
    }

    let arity = expected_arity::<R>();
    if names.len() != arity {
        return Err(Error::MalformedRow(MalformedRowError {
            table: R::TABLE_NAME,
            kind: MalformedRowKind::Arity {
                expected: arity,
                actual: names.len(),
            },
        }));
    }

    let target_table = <R::Target as Entity>::TABLE_NAME;
    let expected = R::fields()
        .iter()
        .map(|f| f.alias(R::TABLE_NAME))
        .chain(
            <R::Target as Entity>::fields()
                .iter()
                .map(|f| f.alias(target_table)),
        );

    for (position, (expected, actual)) in expected.zip(names).enumerate() {
        if expected != *actual {
            return Err(Error::MalformedRow(MalformedRowError {
                table: R::TABLE_NAME,
                kind: MalformedRowKind::ColumnName {
                    position,
                    expected,
                    actual: actual.clone(),
                },
            }));
        }
    }
    Ok(())
}
