//! One-call page loading.

use hydrate_core::{EntityRef, Related, Result};
use hydrate_query::{Query, RowSource};
use hydrate_session::{Session, SessionConfig};

use crate::summary::ResolveSummary;

/// Fetch one page from `source` and resolve it in a fresh session.
///
/// The session is closed on every path, including when the row source fails
/// to start, when a row is malformed, and when the stream breaks part way.
#[tracing::instrument(level = "debug", skip(source, query), fields(table = query.table, mode = ?config.mode))]
pub fn load_page<R, S>(
    source: &mut S,
    query: &Query,
    config: SessionConfig,
) -> Result<Vec<EntityRef<R>>>
where
    R: Related,
    S: RowSource,
{
    let mut session = Session::with_config(config);
    let result = source.fetch(query).and_then(|rows| {
        session
            .resolve::<R, _>(rows)?
            .collect::<Result<Vec<_>>>()
    });
    session.close();

    if let Ok(roots) = &result {
        tracing::info!(summary = %ResolveSummary::from_roots(roots), "Page loaded");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrate_core::{BusinessListing, Category, Timestamp};
    use hydrate_query::{MemoryRowSource, OrderBy};
    use std::sync::Arc;

    fn source() -> MemoryRowSource {
        let listing = |id: i64, category_id: i64| BusinessListing {
            id,
            category_id,
            title: format!("listing {id}"),
            create_date: Timestamp::from_secs(0),
            update_date: Timestamp::from_secs(id),
            category: None,
        };
        MemoryRowSource::new()
            .with_category(Category {
                id: 10,
                name: "Bakeries".into(),
                parent_id: None,
            })
            .with_listing(listing(1, 10))
            .with_listing(listing(2, 10))
            .with_listing(listing(3, 11))
    }

    #[test]
    fn tracked_page_shares_categories() {
        let q = Query::eager::<BusinessListing>().order_by(OrderBy::asc("id"));
        let roots: Vec<EntityRef<BusinessListing>> =
            load_page(&mut source(), &q, SessionConfig::tracked()).unwrap();

        assert_eq!(roots.len(), 3);
        assert!(Arc::ptr_eq(
            roots[0].category.as_ref().unwrap(),
            roots[1].category.as_ref().unwrap()
        ));
        assert!(roots[2].category.is_none());
        // Session closed: only the roots keep the category alive.
        assert_eq!(Arc::strong_count(roots[0].category.as_ref().unwrap()), 2);
    }

    #[test]
    fn source_failure_is_returned() {
        let q = Query::eager::<BusinessListing>();
        let err =
            load_page::<BusinessListing, _>(&mut source().fail_at(2), &q, SessionConfig::untracked())
                .unwrap_err();
        assert!(err.is_row_source());
    }

    #[test]
    fn fetch_failure_is_returned() {
        let q = Query::new("orders");
        let err = load_page::<BusinessListing, _>(&mut source(), &q, SessionConfig::tracked())
            .unwrap_err();
        assert!(err.is_row_source());
    }
}
