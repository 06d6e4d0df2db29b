//! Eager-load join resolution.
//!
//! [`EagerResolver`] pulls joined rows one at a time, materializes them and
//! threads both sides through an [`IdentityScope`]. The scope alone decides
//! whether repeated keys share an instance.
//!
//! Output order is input order and every input row yields exactly one root;
//! the joined shape is to-one, so there is nothing to collapse. On the first
//! error the scope is aborted, the row iterator is dropped and the error is
//! yielded once. Roots already yielded stay valid.

use std::marker::PhantomData;

use hydrate_core::{Entity, EntityRef, Error, Related, Result, Row};

use crate::identity_map::IdentityScope;
use crate::materializer::materialize_row;

/// Resolve `rows` into roots of `R` using `scope`.
pub fn resolve<R, I, S>(rows: I, scope: &mut S) -> EagerResolver<'_, R, I::IntoIter, S>
where
    R: Related,
    I: IntoIterator<Item = Result<Row>>,
    S: IdentityScope,
{
    EagerResolver::new(rows.into_iter(), scope)
}

/// Lazy sequence of resolved roots.
pub struct EagerResolver<'s, R, I, S> {
    /// `None` once exhausted or aborted.
    rows: Option<I>,
    scope: &'s mut S,
    emitted: usize,
    span: tracing::Span,
    _root: PhantomData<fn() -> R>,
}

impl<'s, R, I, S> EagerResolver<'s, R, I, S>
where
    R: Related,
    I: Iterator<Item = Result<Row>>,
    S: IdentityScope,
{
    /// Wrap `rows`; nothing is pulled until the first `next`.
    pub fn new(rows: I, scope: &'s mut S) -> Self {
        let span = tracing::debug_span!(
            "resolve",
            root = R::TABLE_NAME,
            relation = R::RELATION,
            tracking = scope.is_tracking()
        );
        Self {
            rows: Some(rows),
            scope,
            emitted: 0,
            span,
            _root: PhantomData,
        }
    }

    /// Roots yielded so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn resolve_row(&mut self, row: &Row) -> Result<EntityRef<R>> {
        let (mut root, related) = materialize_row::<R>(row)?;

        let related = match related {
            Some(target) => {
                let key = target.primary_key();
                Some(self.scope.resolve(key, move || target)?)
            }
            None => None,
        };
        root.attach(related);

        let key = root.primary_key();
        self.scope.resolve(key, move || root)
    }

    fn abort(&mut self, err: Error) -> Option<Result<EntityRef<R>>> {
        tracing::warn!(
            emitted = self.emitted,
            error = %err,
            "Resolution aborted"
        );
        self.rows = None;
        self.scope.abort();
        Some(Err(err))
    }
}

impl<R, I, S> Iterator for EagerResolver<'_, R, I, S>
where
    R: Related,
    I: Iterator<Item = Result<Row>>,
    S: IdentityScope,
{
    type Item = Result<EntityRef<R>>;

    fn next(&mut self) -> Option<Self::Item> {
        let span = self.span.clone();
        let _enter = span.enter();

        let next = self.rows.as_mut()?.next();
        match next {
            None => {
                self.rows = None;
                tracing::debug!(
                    emitted = self.emitted,
                    retained = self.scope.len(),
                    "Resolution complete"
                );
                None
            }
            Some(Err(err)) => self.abort(err),
            Some(Ok(row)) => match self.resolve_row(&row) {
                Ok(root) => {
                    self.emitted += 1;
                    Some(Ok(root))
                }
                Err(err) => self.abort(err),
            },
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.rows {
            Some(rows) => (0, rows.size_hint().1),
            None => (0, Some(0)),
        }
    }
}

impl<R, I, S> std::iter::FusedIterator for EagerResolver<'_, R, I, S>
where
    R: Related,
    I: Iterator<Item = Result<Row>>,
    S: IdentityScope,
{
}
