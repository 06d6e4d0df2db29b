//! Query descriptions and row sources for hydrate.
//!
//! `hydrate-query` describes *what* to fetch (`Query`, `IncludeSpec`,
//! `UpdateWindow`) and defines the `RowSource` contract that executes it.
//! It never builds SQL text for a particular dialect; that belongs to the
//! driver behind a `RowSource`.

pub mod eager;
pub mod select;
pub mod source;

pub use eager::{IncludeSpec, build_aliased_column_parts, joined_column_names};
pub use select::{DEFAULT_LIMIT, Direction, OrderBy, Query, RangeFilter, UpdateWindow};
pub use source::{MemoryRowSource, MemoryRows, RowSource};
