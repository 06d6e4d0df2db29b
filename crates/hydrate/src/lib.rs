//! Hydrate - entity materialization with explicit identity semantics.
//!
//! Hydrate turns the flat rows of a root-plus-related LEFT OUTER JOIN into
//! object graphs, providing:
//!
//! - Positional row mapping through the `Entity` and `Related` traits
//! - Tracked sessions, where one key means one shared instance
//! - Untracked sessions, where every occurrence is its own instance
//! - A lazy, order-preserving eager-load resolver
//!
//! # Quick Start
//!
//! ```ignore
//! use hydrate::prelude::*;
//!
//! let window = UpdateWindow::spanning(Timestamp::from_secs(1_700_000_000), 3600);
//! let query = Query::updated_between::<BusinessListing>(window);
//!
//! let listings: Vec<EntityRef<BusinessListing>> =
//!     load_page(&mut source, &query, SessionConfig::untracked())?;
//!
//! println!("{}", ResolveSummary::from_roots(&listings));
//! ```
//!
//! # Tracking
//!
//! A tracked session resolves every `(type, key)` through an identity map, so
//! two listings in the same category hold the same `Arc<Category>`. An
//! untracked session builds a fresh instance per row and retains nothing.
//! In both modes a listing whose category row is missing gets `None`.

pub mod page;
pub mod summary;

// Re-export all public types from sub-crates
pub use hydrate_core::{
    BusinessListing, Category, CategoryHierarchy, ColumnInfo, Entity, EntityRef, Error,
    FieldInfo, FromValue, IdentityMismatchError, MalformedRowError, MalformedRowKind, Related,
    Result, Row, RowSourceError, SqlType, Timestamp, TypeError, Value, decode_column,
};
pub use hydrate_query::{
    DEFAULT_LIMIT, Direction, IncludeSpec, MemoryRowSource, MemoryRows, OrderBy, Query,
    RangeFilter, RowSource, UpdateWindow, build_aliased_column_parts, joined_column_names,
};
pub use hydrate_session::{
    EagerResolver, IdentityMap, IdentityScope, IdentityStats, NoTracking, Session,
    SessionConfig, SessionScope, TrackingMode, expected_arity, materialize_row, resolve,
};

pub use page::load_page;
pub use summary::ResolveSummary;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        // Domain models
        BusinessListing,
        Category,
        CategoryHierarchy,
        // Core traits and types
        Entity,
        EntityRef,
        Error,
        // Query description
        OrderBy,
        Query,
        Related,
        ResolveSummary,
        Result,
        Row,
        RowSource,
        // Session
        Session,
        SessionConfig,
        Timestamp,
        TrackingMode,
        UpdateWindow,
        Value,
        load_page,
    };
}
