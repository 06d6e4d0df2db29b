use std::cell::Cell;
use std::sync::Arc;

use hydrate::prelude::*;
use hydrate::{MemoryRowSource, ResolveSummary};

fn listing(id: i64, category_id: i64, updated_secs: i64) -> BusinessListing {
    BusinessListing {
        id,
        category_id,
        title: format!("listing {id}"),
        create_date: Timestamp::from_secs(0),
        update_date: Timestamp::from_secs(updated_secs),
        category: None,
    }
}

fn category(id: i64, name: &str, parent_id: Option<i64>) -> Category {
    Category {
        id,
        name: name.to_string(),
        parent_id,
    }
}

/// Two listings in category 10 and one pointing at a category that does not exist.
fn two_shared_one_dangling() -> MemoryRowSource {
    MemoryRowSource::new()
        .with_category(category(10, "Bakeries", None))
        .with_listing(listing(1, 10, 1))
        .with_listing(listing(2, 10, 2))
        .with_listing(listing(3, 77, 3))
}

fn by_id() -> Query {
    Query::eager::<BusinessListing>().order_by(OrderBy::asc("id"))
}

fn load(
    source: &mut MemoryRowSource,
    query: &Query,
    config: SessionConfig,
) -> Vec<EntityRef<BusinessListing>> {
    load_page(source, query, config).unwrap()
}

#[test]
fn tracked_session_shares_one_category_instance() {
    let roots = load(&mut two_shared_one_dangling(), &by_id(), SessionConfig::tracked());

    let a = roots[0].category.as_ref().unwrap();
    let b = roots[1].category.as_ref().unwrap();
    assert!(Arc::ptr_eq(a, b));
    assert_eq!(a.name, "Bakeries");
    assert!(roots[2].category.is_none());
}

#[test]
fn untracked_session_builds_equal_but_distinct_instances() {
    let roots = load(&mut two_shared_one_dangling(), &by_id(), SessionConfig::untracked());

    let b = roots[0].category.as_ref().unwrap();
    let c = roots[1].category.as_ref().unwrap();
    assert!(!Arc::ptr_eq(b, c));
    assert_eq!(b, c);
    assert!(roots[2].category.is_none());
}

#[test]
fn modes_agree_on_values() {
    let mut source = two_shared_one_dangling();
    let tracked = load(&mut source, &by_id(), SessionConfig::tracked());
    let untracked = load(&mut source, &by_id(), SessionConfig::untracked());

    assert_eq!(tracked.len(), untracked.len());
    for (t, u) in tracked.iter().zip(&untracked) {
        assert_eq!(**t, **u);
    }
}

#[test]
fn fresh_sessions_are_idempotent_but_independent() {
    let mut source = two_shared_one_dangling();
    let first = load(&mut source, &by_id(), SessionConfig::tracked());
    let second = load(&mut source, &by_id(), SessionConfig::tracked());

    assert_eq!(first, second);
    assert!(!Arc::ptr_eq(&first[0], &second[0]));
    assert!(!Arc::ptr_eq(
        first[0].category.as_ref().unwrap(),
        second[0].category.as_ref().unwrap()
    ));
}

#[test]
fn empty_source_yields_empty_page() {
    let roots = load(&mut MemoryRowSource::new(), &by_id(), SessionConfig::tracked());
    assert!(roots.is_empty());
    assert!(ResolveSummary::from_roots(&roots).is_complete());
}

#[test]
fn deleted_category_is_reported_missing() {
    let mut source = two_shared_one_dangling();
    assert!(source.delete_category(10));

    let roots = load(&mut source, &by_id(), SessionConfig::untracked());
    let summary = ResolveSummary::from_roots(&roots);

    assert_eq!(summary.total, 3);
    assert_eq!(summary.with_related, 0);
    assert_eq!(summary.missing_related, 3);
    // The foreign key itself is still reported.
    assert_eq!(roots[0].category_id, 10);
}

#[test]
fn summary_serializes() {
    let roots = load(&mut two_shared_one_dangling(), &by_id(), SessionConfig::tracked());
    let json = ResolveSummary::from_roots(&roots).to_json();

    assert_eq!(json["total"], 3);
    assert_eq!(json["with_related"], 2);
    assert_eq!(json["missing_related"], 1);
    assert_eq!(json["relation"], "category");
}

#[test]
fn broken_stream_fails_the_page() {
    let mut source = two_shared_one_dangling().fail_at(1);
    let err = load_page::<BusinessListing, _>(&mut source, &by_id(), SessionConfig::tracked())
        .unwrap_err();
    assert!(err.is_row_source());
    assert!(!err.is_mapping_bug());
}

#[test]
fn manual_session_stops_after_error() {
    let mut source = two_shared_one_dangling().fail_at(1);
    let rows = source.fetch(&by_id()).unwrap();

    let mut session = Session::open(TrackingMode::Tracked);
    let mut resolved = session.resolve::<BusinessListing, _>(rows).unwrap();
    let first = resolved.next().unwrap().unwrap();
    assert!(resolved.next().unwrap().is_err());
    assert!(resolved.next().is_none());
    drop(resolved);

    assert!(session.is_closed());
    assert_eq!(session.tracked_count(), 0);
    assert_eq!(first.category.as_ref().unwrap().id, 10);
}

#[test]
fn malformed_rows_fail_resolution() {
    let rows = vec![Ok(Row::positional(vec![Value::BigInt(1), Value::Null]))];
    let mut session = Session::open(TrackingMode::Untracked);
    let err = session
        .resolve::<BusinessListing, _>(rows)
        .unwrap()
        .next()
        .unwrap()
        .unwrap_err();

    assert!(matches!(err, Error::MalformedRow(_)));
    assert!(!err.is_row_source());
    assert!(session.is_closed());
}

#[test]
fn resolver_pulls_one_row_per_root() {
    let mut source = two_shared_one_dangling();
    let pulled = Cell::new(0);
    let rows = source
        .fetch(&by_id())
        .unwrap()
        .inspect(|_| pulled.set(pulled.get() + 1));

    let mut session = Session::open(TrackingMode::Tracked);
    let mut resolved = session.resolve::<BusinessListing, _>(rows).unwrap();
    assert_eq!(pulled.get(), 0);

    resolved.next().unwrap().unwrap();
    assert_eq!(pulled.get(), 1);
    resolved.next().unwrap().unwrap();
    assert_eq!(pulled.get(), 2);
}

#[test]
fn far_future_window_is_not_empty() {
    let start = Timestamp::from_secs(1_546_300_800);
    let window = UpdateWindow::spanning(start, i64::MAX / 1_000_000);
    assert!(window.after < window.before);

    let mut source = MemoryRowSource::new()
        .with_category(category(1, "Cafes", None))
        .with_listing(listing(1, 1, 1_546_300_801))
        .with_listing(listing(2, 1, 4_000_000_000));
    let roots = load(
        &mut source,
        &Query::updated_between::<BusinessListing>(window),
        SessionConfig::untracked(),
    );

    let ids: Vec<i64> = roots.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn abandoning_iteration_releases_session() {
    let mut source = two_shared_one_dangling();
    let rows = source.fetch(&by_id()).unwrap();

    let mut session = Session::open(TrackingMode::Tracked);
    let first = session
        .resolve::<BusinessListing, _>(rows)
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    let category = Arc::clone(first.category.as_ref().unwrap());
    session.close();

    // first + local handle; the identity map no longer holds it.
    assert_eq!(Arc::strong_count(&category), 2);
}

#[test]
fn update_window_selects_ordered_page() {
    let mut source = MemoryRowSource::new().with_category(category(1, "Cafes", None));
    for id in 1..=250 {
        // Reverse insertion order so sorting is observable.
        source = source.with_listing(listing(id, 1, 1_000 - id));
    }

    let window = UpdateWindow::new(Timestamp::from_secs(800), Timestamp::from_secs(1_000));
    let query = Query::updated_between::<BusinessListing>(window);
    let roots = load(&mut source, &query, SessionConfig::untracked());

    assert_eq!(roots.len() as u64, hydrate::DEFAULT_LIMIT);
    assert!(roots.iter().all(|l| window.contains(l.update_date)));
    assert!(roots.windows(2).all(|w| w[0].update_date < w[1].update_date));
    assert_eq!(roots[0].update_date, Timestamp::from_secs(801));

    let next = load(&mut source, &query.clone().offset(100), SessionConfig::untracked());
    assert_eq!(next.len(), 99);
    assert!(next[0].update_date > roots[99].update_date);
}

#[test]
fn loaded_categories_form_a_hierarchy() {
    let mut source = MemoryRowSource::new()
        .with_category(category(1, "Food", None))
        .with_category(category(2, "Bakeries", Some(1)))
        .with_category(category(3, "Cafes", Some(1)))
        .with_listing(listing(10, 2, 1))
        .with_listing(listing(11, 3, 2))
        .with_listing(listing(12, 2, 3));

    let roots = load(&mut source, &by_id(), SessionConfig::tracked());
    let hierarchy = CategoryHierarchy::from_categories(
        roots.iter().filter_map(|l| l.category.clone()),
    );

    assert_eq!(hierarchy.len(), 2);
    // Parent 1 was never joined, so both loaded categories are roots.
    assert_eq!(hierarchy.roots().len(), 2);
    assert!(hierarchy.parent(2).is_none());
}
