//! Identity Map pattern for one instance per primary key.
//!
//! The identity map ensures that, within one session, every `(entity type,
//! primary key)` pair resolves to exactly one [`EntityRef`]. Two listings
//! pointing at category 10 therefore share a single `Arc<Category>`.
//!
//! # Design
//!
//! Resolution goes through the [`IdentityScope`] trait, which has two
//! implementations:
//!
//! - [`IdentityMap`]: tracked. Entries are type-erased `Arc<M>` values keyed
//!   by `(TypeId, key)`; repeated keys return clones of the stored `Arc`.
//! - [`NoTracking`]: untracked. Every call wraps the freshly built instance
//!   in a new `Arc`; nothing is retained.
//!
//! # Example
//!
//! ```ignore
//! let mut map = IdentityMap::new();
//!
//! let a = map.get_or_insert(10, || category.clone())?;
//! let b = map.get_or_insert(10, || category.clone())?;
//!
//! assert!(Arc::ptr_eq(&a, &b));
//! ```

use hydrate_core::{Entity, EntityRef, Error, IdentityMismatchError, Result};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Strategy for turning a materialized instance into the reference that is
/// handed out.
pub trait IdentityScope {
    /// Resolve `(M, key)` to an instance, building it with `factory` only when
    /// no instance is already known for that key.
    fn resolve<M: Entity>(&mut self, key: i64, factory: impl FnOnce() -> M)
    -> Result<EntityRef<M>>;

    /// Release every retained instance.
    fn clear(&mut self);

    /// Called when a resolution fails part way. Defaults to [`clear`](Self::clear).
    fn abort(&mut self) {
        self.clear();
    }

    /// Number of retained instances.
    fn len(&self) -> usize;

    /// Whether nothing is retained.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this scope deduplicates instances.
    fn is_tracking(&self) -> bool;
}

/// Lookup counters, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityStats {
    /// Lookups answered from the map.
    pub hits: u64,
    /// Lookups that built and registered a new instance.
    pub misses: u64,
}

/// Identity Map for tracking unique instances.
///
/// The map is keyed by `(TypeId, primary key)` so each entity type has its
/// own key namespace.
#[derive(Default)]
pub struct IdentityMap {
    /// Type-erased `Arc<M>` per key.
    entries: HashMap<(TypeId, i64), Box<dyn Any + Send + Sync>>,
    stats: IdentityStats,
}

impl std::fmt::Debug for IdentityMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityMap")
            .field("entries", &self.entries.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl IdentityMap {
    /// Create a new empty identity map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an identity map sized for roughly `capacity` instances.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            stats: IdentityStats::default(),
        }
    }

    /// Return the instance registered under `(M, key)`, or build one with
    /// `factory`, register it and return it.
    ///
    /// `factory` is not invoked when an instance already exists. If it builds
    /// an instance whose primary key differs from `key`, nothing is
    /// registered and an [`IdentityMismatchError`] is returned.
    pub fn get_or_insert<M: Entity>(
        &mut self,
        key: i64,
        factory: impl FnOnce() -> M,
    ) -> Result<EntityRef<M>> {
        let slot = (TypeId::of::<M>(), key);

        if let Some(entry) = self.entries.get(&slot) {
            let existing = entry.downcast_ref::<EntityRef<M>>().ok_or_else(|| {
                Error::Custom(format!(
                    "identity map entry for {} {} has an unexpected type",
                    M::TABLE_NAME,
                    key
                ))
            })?;
            self.stats.hits += 1;
            tracing::trace!(table = M::TABLE_NAME, key, "Identity map hit");
            return Ok(Arc::clone(existing));
        }

        let instance = factory();
        let produced = instance.primary_key();
        if produced != key {
            return Err(Error::IdentityMismatch(IdentityMismatchError {
                table: M::TABLE_NAME,
                requested: key,
                produced,
            }));
        }

        let instance: EntityRef<M> = Arc::new(instance);
        self.entries.insert(slot, Box::new(Arc::clone(&instance)));
        self.stats.misses += 1;
        tracing::trace!(table = M::TABLE_NAME, key, "Identity map insert");
        Ok(instance)
    }

    /// Get the instance registered under `(M, key)`.
    pub fn get<M: Entity>(&self, key: i64) -> Option<EntityRef<M>> {
        self.entries
            .get(&(TypeId::of::<M>(), key))?
            .downcast_ref::<EntityRef<M>>()
            .map(Arc::clone)
    }

    /// Check if an instance is registered under `(M, key)`.
    pub fn contains<M: Entity>(&self, key: i64) -> bool {
        self.entries.contains_key(&(TypeId::of::<M>(), key))
    }

    /// Clear all entries from the identity map.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Get the number of entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hit/miss counters since creation.
    #[must_use]
    pub fn stats(&self) -> IdentityStats {
        self.stats
    }
}

impl IdentityScope for IdentityMap {
    fn resolve<M: Entity>(
        &mut self,
        key: i64,
        factory: impl FnOnce() -> M,
    ) -> Result<EntityRef<M>> {
        self.get_or_insert(key, factory)
    }

    fn clear(&mut self) {
        IdentityMap::clear(self);
    }

    fn len(&self) -> usize {
        IdentityMap::len(self)
    }

    fn is_tracking(&self) -> bool {
        true
    }
}

/// Scope that never deduplicates: each call yields a fresh instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTracking;

impl IdentityScope for NoTracking {
    fn resolve<M: Entity>(
        &mut self,
        _key: i64,
        factory: impl FnOnce() -> M,
    ) -> Result<EntityRef<M>> {
        Ok(Arc::new(factory()))
    }

    fn clear(&mut self) {}

    fn len(&self) -> usize {
        0
    }

    fn is_tracking(&self) -> bool {
        false
    }
}
