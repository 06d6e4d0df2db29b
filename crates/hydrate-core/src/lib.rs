//! Core types and traits for hydrate.
//!
//! This crate provides the foundations the materialization layers build on:
//!
//! - `Value` and `Row` for flat result tuples
//! - `Entity` and `Related` traits for positional row mapping
//! - `Error` taxonomy shared by every layer
//! - the listing/category domain models and the category hierarchy arena

pub mod error;
pub mod field;
pub mod hierarchy;
pub mod listing;
pub mod model;
pub mod row;
pub mod types;
pub mod value;

pub use error::{
    Error, IdentityMismatchError, MalformedRowError, MalformedRowKind, Result, RowSourceError,
    TypeError,
};
pub use field::FieldInfo;
pub use hierarchy::CategoryHierarchy;
pub use listing::{BusinessListing, Category};
pub use model::{Entity, EntityRef, Related, decode_column};
pub use row::{ColumnInfo, FromValue, Row};
pub use types::{SqlType, Timestamp};
pub use value::Value;
