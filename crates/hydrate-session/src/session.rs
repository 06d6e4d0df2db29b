//! Materialization sessions.
//!
//! A [`Session`] is the scope of one logical read. It picks tracked or
//! untracked resolution when opened and owns the identity map for its whole
//! lifetime. Closing the session, explicitly or by dropping it, releases
//! every retained instance.

use std::sync::atomic::{AtomicU64, Ordering};

use hydrate_core::{Entity, EntityRef, Error, Related, Result, Row};

use crate::identity_map::{IdentityMap, IdentityScope, NoTracking};
use crate::resolver::EagerResolver;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Whether materialized instances are deduplicated through an identity map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingMode {
    /// One instance per `(type, key)` for the lifetime of the session.
    #[default]
    Tracked,
    /// A fresh instance for every occurrence; nothing retained.
    Untracked,
}

/// Configuration for Session behavior.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Tracking mode for every resolution in the session.
    pub mode: TrackingMode,
    /// Initial identity map capacity. Ignored when untracked.
    pub expected_instances: usize,
}

impl SessionConfig {
    /// Tracked session configuration.
    #[must_use]
    pub fn tracked() -> Self {
        Self::default()
    }

    /// Untracked session configuration.
    #[must_use]
    pub fn untracked() -> Self {
        Self {
            mode: TrackingMode::Untracked,
            ..Self::default()
        }
    }

    /// Pre-size the identity map.
    #[must_use]
    pub fn expected_instances(mut self, n: usize) -> Self {
        self.expected_instances = n;
        self
    }
}

/// The identity scope owned by a session.
#[derive(Debug)]
pub enum SessionScope {
    /// Deduplicating scope backed by an identity map.
    Tracked(IdentityMap),
    /// Pass-through scope; every resolution allocates.
    Untracked(NoTracking),
    /// Released scope. Every resolution fails with [`Error::SessionClosed`].
    Closed,
}

impl SessionScope {
    fn open(config: &SessionConfig) -> Self {
        match config.mode {
            TrackingMode::Tracked => {
                SessionScope::Tracked(IdentityMap::with_capacity(config.expected_instances))
            }
            TrackingMode::Untracked => SessionScope::Untracked(NoTracking),
        }
    }

    /// Whether the scope has been released.
    pub fn is_closed(&self) -> bool {
        matches!(self, SessionScope::Closed)
    }
}

impl IdentityScope for SessionScope {
    fn resolve<M: Entity>(
        &mut self,
        key: i64,
        factory: impl FnOnce() -> M,
    ) -> Result<EntityRef<M>> {
        match self {
            SessionScope::Tracked(map) => map.get_or_insert(key, factory),
            SessionScope::Untracked(scope) => scope.resolve(key, factory),
            SessionScope::Closed => Err(Error::SessionClosed),
        }
    }

    fn clear(&mut self) {
        match self {
            SessionScope::Tracked(map) => map.clear(),
            SessionScope::Untracked(_) | SessionScope::Closed => {}
        }
    }

    /// A failed resolution closes the session.
    fn abort(&mut self) {
        self.clear();
        *self = SessionScope::Closed;
    }

    fn len(&self) -> usize {
        match self {
            SessionScope::Tracked(map) => map.len(),
            SessionScope::Untracked(_) | SessionScope::Closed => 0,
        }
    }

    fn is_tracking(&self) -> bool {
        matches!(self, SessionScope::Tracked(_))
    }
}

/// A scoped materialization context.
///
/// Resolution borrows the session mutably, so one session serves one
/// resolution at a time. Independent sessions never share instances.
///
/// # Example
///
/// ```ignore
/// let mut session = Session::open(TrackingMode::Tracked);
/// let rows = source.fetch(&query)?;
/// let listings = session
///     .resolve::<BusinessListing, _>(rows)?
///     .collect::<Result<Vec<_>>>()?;
/// session.close();
/// ```
#[derive(Debug)]
pub struct Session {
    id: u64,
    mode: TrackingMode,
    scope: SessionScope,
}

impl Session {
    /// Open a session in `mode` with default configuration.
    #[must_use]
    pub fn open(mode: TrackingMode) -> Self {
        Self::with_config(SessionConfig {
            mode,
            ..SessionConfig::default()
        })
    }

    /// Open a session with explicit configuration.
    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(session = id, mode = ?config.mode, "Session opened");
        Self {
            id,
            mode: config.mode,
            scope: SessionScope::open(&config),
        }
    }

    /// Process-unique session id, for log correlation.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Tracking mode chosen at open. Unchanged by closing.
    pub fn mode(&self) -> TrackingMode {
        self.mode
    }

    /// Whether the session has been closed, explicitly or by a failed
    /// resolution.
    pub fn is_closed(&self) -> bool {
        self.scope.is_closed()
    }

    /// Instances currently retained by the identity map.
    pub fn tracked_count(&self) -> usize {
        self.scope.len()
    }

    /// Resolve joined rows into roots of `R`.
    ///
    /// The returned iterator is lazy: each call to `next` pulls exactly one
    /// row. Any error it yields has already closed this session.
    pub fn resolve<R, I>(
        &mut self,
        rows: I,
    ) -> Result<EagerResolver<'_, R, I::IntoIter, SessionScope>>
    where
        R: Related,
        I: IntoIterator<Item = Result<Row>>,
    {
        if self.is_closed() {
            return Err(Error::SessionClosed);
        }
        tracing::debug!(session = self.id, root = R::TABLE_NAME, "Resolving rows");
        Ok(EagerResolver::new(rows.into_iter(), &mut self.scope))
    }

    /// Close the session, releasing the identity map.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.scope.is_closed() {
            return;
        }
        let released = self.scope.len();
        self.scope.abort();
        tracing::debug!(session = self.id, released, "Session closed");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.release();
    }
}
