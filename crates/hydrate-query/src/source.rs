//! Row sources.
//!
//! A [`RowSource`] executes a [`Query`] and yields flat rows lazily. Real
//! sources live outside this workspace; [`MemoryRowSource`] runs the
//! listing/category query shape over in-memory tables.

use std::collections::HashMap;
use std::sync::Arc;

use hydrate_core::{
    BusinessListing, Category, ColumnInfo, Entity, Error, Result, Row, RowSourceError, Value,
};

use crate::eager::{build_aliased_column_parts, joined_column_names};
use crate::select::{Direction, Query};

/// Executes queries and produces rows in the requested order.
pub trait RowSource {
    /// Lazy row sequence for one statement.
    type Rows: Iterator<Item = Result<Row>>;

    /// Execute `query`.
    fn fetch(&mut self, query: &Query) -> Result<Self::Rows>;
}

/// In-memory listings and categories tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryRowSource {
    listings: Vec<BusinessListing>,
    categories: Vec<Category>,
    fail_at: Option<usize>,
}

impl MemoryRowSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listing row.
    #[must_use]
    pub fn with_listing(mut self, listing: BusinessListing) -> Self {
        self.listings.push(listing);
        self
    }

    /// Add a category row.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    /// Yield an error in place of the row at `position` and stop there.
    #[must_use]
    pub fn fail_at(mut self, position: usize) -> Self {
        self.fail_at = Some(position);
        self
    }

    /// Remove a category, leaving any listing that references it dangling.
    pub fn delete_category(&mut self, id: i64) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c.id != id);
        self.categories.len() != before
    }

    fn sort_key(listing: &BusinessListing, column: &str) -> Result<i64> {
        match column {
            "update_date" => Ok(listing.update_date.as_micros()),
            "create_date" => Ok(listing.create_date.as_micros()),
            "id" => Ok(listing.id),
            other => Err(unsupported(format!("cannot order by column '{other}'"))),
        }
    }
}

fn unsupported(message: String) -> Error {
    Error::RowSource(RowSourceError::new(message))
}

impl RowSource for MemoryRowSource {
    type Rows = MemoryRows;

    #[tracing::instrument(level = "debug", skip(self, query), fields(query = %query))]
    fn fetch(&mut self, query: &Query) -> Result<MemoryRows> {
        if query.table != BusinessListing::TABLE_NAME {
            return Err(unsupported(format!("unknown table '{}'", query.table)));
        }
        if let Some(inc) = &query.include {
            if inc.related_table != Category::TABLE_NAME {
                return Err(unsupported(format!(
                    "cannot join table '{}'",
                    inc.related_table
                )));
            }
        }

        let mut matched: Vec<&BusinessListing> = Vec::with_capacity(self.listings.len());
        for listing in &self.listings {
            if let Some(filter) = &query.filter {
                let ts = match filter.column {
                    "update_date" => listing.update_date,
                    "create_date" => listing.create_date,
                    other => return Err(unsupported(format!("cannot filter on '{other}'"))),
                };
                if !filter.window.contains(ts) {
                    continue;
                }
            }
            matched.push(listing);
        }

        if let Some(order) = &query.order_by {
            // Validate the column up front so the sort comparator cannot fail.
            for listing in &matched {
                Self::sort_key(listing, order.column)?;
            }
            let column = order.column;
            let key = |l: &BusinessListing| Self::sort_key(l, column).unwrap_or_default();
            // Ties fall back to id so paging is stable.
            matched.sort_by(|a, b| {
                let ord = key(*a).cmp(&key(*b)).then(a.id.cmp(&b.id));
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        let page: Vec<BusinessListing> = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        let join = query.include.is_some();
        let names = if join {
            joined_column_names::<BusinessListing>()
        } else {
            build_aliased_column_parts(BusinessListing::TABLE_NAME, BusinessListing::fields())
        };
        // First category wins on duplicate ids.
        let categories = join.then(|| {
            let mut by_id = HashMap::with_capacity(self.categories.len());
            for category in &self.categories {
                by_id.entry(category.id).or_insert_with(|| category.clone());
            }
            by_id
        });

        tracing::debug!(row_count = page.len(), "Memory fetch planned");

        Ok(MemoryRows {
            listings: page.into_iter(),
            categories,
            columns: Arc::new(ColumnInfo::new(names)),
            position: 0,
            fail_at: self.fail_at,
        })
    }
}

/// Rows produced by [`MemoryRowSource`].
///
/// The page is fixed at fetch time; each joined row is built when it is
/// pulled.
#[derive(Debug)]
pub struct MemoryRows {
    listings: std::vec::IntoIter<BusinessListing>,
    /// Category snapshot keyed by id, `None` when the query has no join.
    categories: Option<HashMap<i64, Category>>,
    columns: Arc<ColumnInfo>,
    position: usize,
    fail_at: Option<usize>,
}

impl MemoryRows {
    fn build_row(&self, listing: &BusinessListing) -> Row {
        let mut values = listing.to_columns();
        if let Some(categories) = &self.categories {
            match categories.get(&listing.category_id) {
                Some(category) => values.extend(category.to_columns()),
                None => values.extend(std::iter::repeat_n(Value::Null, Category::column_count())),
            }
        }
        Row::with_columns(Arc::clone(&self.columns), values)
    }
}

impl Iterator for MemoryRows {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fail_at == Some(self.position) {
            self.fail_at = None;
            self.listings = Vec::new().into_iter();
            return Some(Err(Error::RowSource(RowSourceError::new(format!(
                "connection lost at row {}",
                self.position
            )))));
        }
        let listing = self.listings.next()?;
        self.position += 1;
        Some(Ok(self.build_row(&listing)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.listings.len();
        match self.fail_at {
            Some(_) => (0, Some(remaining)),
            None => (remaining, Some(remaining)),
        }
    }
}
