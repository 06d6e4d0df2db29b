//! Query descriptions handed to a row source.

use std::fmt;

use hydrate_core::{Related, Timestamp};
use serde::{Deserialize, Serialize};

use crate::eager::IncludeSpec;

/// Default page size when none is requested.
pub const DEFAULT_LIMIT: u64 = 100;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// ORDER BY on a single root column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub direction: Direction,
}

impl OrderBy {
    #[must_use]
    pub const fn asc(column: &'static str) -> Self {
        Self {
            column,
            direction: Direction::Asc,
        }
    }

    #[must_use]
    pub const fn desc(column: &'static str) -> Self {
        Self {
            column,
            direction: Direction::Desc,
        }
    }
}

/// Exclusive time window: `after < t < before`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateWindow {
    pub after: Timestamp,
    pub before: Timestamp,
}

impl UpdateWindow {
    #[must_use]
    pub const fn new(after: Timestamp, before: Timestamp) -> Self {
        Self { after, before }
    }

    /// Window starting at `after` and spanning `secs` seconds.
    ///
    /// The end bound saturates at [`Timestamp::MAX`].
    #[must_use]
    pub const fn spanning(after: Timestamp, secs: i64) -> Self {
        Self {
            after,
            before: after.add_secs(secs),
        }
    }

    /// Both bounds are strict.
    pub fn contains(&self, ts: Timestamp) -> bool {
        self.after < ts && ts < self.before
    }
}

/// Filter on one root timestamp column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeFilter {
    pub column: &'static str,
    pub window: UpdateWindow,
}

/// Everything a row source needs to produce one page of joined rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub table: &'static str,
    pub include: Option<IncludeSpec>,
    pub filter: Option<RangeFilter>,
    pub order_by: Option<OrderBy>,
    pub offset: u64,
    pub limit: u64,
}

impl Query {
    /// Query over `table` with default paging and no filter.
    #[must_use]
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            include: None,
            filter: None,
            order_by: None,
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Query over `R`'s table with its relation eagerly joined.
    #[must_use]
    pub fn eager<R: Related>() -> Self {
        Self::new(R::TABLE_NAME).include(IncludeSpec::for_relation::<R>())
    }

    /// Roots whose `update_date` falls strictly inside `window`, ascending
    /// by `update_date`, first page of [`DEFAULT_LIMIT`].
    #[must_use]
    pub fn updated_between<R: Related>(window: UpdateWindow) -> Self {
        Self::eager::<R>()
            .filter("update_date", window)
            .order_by(OrderBy::asc("update_date"))
    }

    #[must_use]
    pub fn include(mut self, spec: IncludeSpec) -> Self {
        self.include = Some(spec);
        self
    }

    #[must_use]
    pub fn filter(mut self, column: &'static str, window: UpdateWindow) -> Self {
        self.filter = Some(RangeFilter { column, window });
        self
    }

    #[must_use]
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by = Some(order);
        self
    }

    #[must_use]
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = n;
        self
    }

    #[must_use]
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = n;
        self
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table)?;
        if let Some(inc) = &self.include {
            write!(
                f,
                " LEFT JOIN {} ON {}.{} = {}.{}",
                inc.related_table, self.table, inc.local_key, inc.related_table, inc.remote_key
            )?;
        }
        if let Some(RangeFilter { column, window }) = &self.filter {
            write!(f, " WHERE {} < {} < {}", window.after, column, window.before)?;
        }
        if let Some(order) = &self.order_by {
            let dir = match order.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            write!(f, " ORDER BY {} {}", order.column, dir)?;
        }
        write!(f, " OFFSET {} LIMIT {}", self.offset, self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrate_core::BusinessListing;

    #[test]
    fn window_bounds_are_exclusive() {
        let w = UpdateWindow::spanning(Timestamp::from_secs(100), 10);
        assert!(!w.contains(Timestamp::from_secs(100)));
        assert!(w.contains(Timestamp::from_secs(105)));
        assert!(!w.contains(Timestamp::from_secs(110)));
    }

    #[test]
    fn oversized_span_keeps_window_ordered() {
        let start = Timestamp::from_secs(1_546_300_800);
        let w = UpdateWindow::spanning(start, i64::MAX / 1_000_000);
        assert_eq!(w.before, Timestamp::MAX);
        assert!(w.contains(start.add_secs(1)));
        assert!(!w.contains(start));
    }

    #[test]
    fn updated_between_shape() {
        let w = UpdateWindow::spanning(Timestamp::from_secs(0), 60);
        let q = Query::updated_between::<BusinessListing>(w);
        assert_eq!(q.table, "listings");
        assert_eq!(q.offset, 0);
        assert_eq!(q.limit, DEFAULT_LIMIT);
        assert_eq!(q.order_by, Some(OrderBy::asc("update_date")));
        assert_eq!(q.filter.as_ref().unwrap().column, "update_date");
        assert_eq!(q.include.as_ref().unwrap().related_table, "categories");
    }

    #[test]
    fn display_describes_query() {
        let q = Query::eager::<BusinessListing>()
            .order_by(OrderBy::desc("id"))
            .offset(5)
            .limit(10);
        assert_eq!(
            q.to_string(),
            "listings LEFT JOIN categories ON listings.category_id = categories.id \
             ORDER BY id DESC OFFSET 5 LIMIT 10"
        );
    }
}
