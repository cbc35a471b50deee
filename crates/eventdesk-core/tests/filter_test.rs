#![allow(clippy::unwrap_used)]

mod common;

use pretty_assertions::assert_eq;

use common::{Call, FakeBackend, Harness, summary};
use eventdesk_core::{Category, CategoryId, LoadOutcome, LocalCache, PageQuery};

const USER: &str = "ada@example.com";

fn categories() -> Vec<Category> {
    vec![
        Category {
            id: CategoryId(1),
            title: "Music".into(),
        },
        Category {
            id: CategoryId(5),
            title: "Tech".into(),
        },
    ]
}

#[tokio::test]
async fn changing_the_filter_reopens_an_exhausted_list() {
    let backend = FakeBackend::with_events(4);
    backend.set_events(Some(CategoryId(5)), (50..53).map(summary).collect());
    let h = Harness::signed_in(backend, USER);

    h.desk.events().initialize(None).await.unwrap();
    assert!(!h.desk.events().has_more());
    assert_eq!(
        h.desk.events().load_next_page().await.unwrap(),
        LoadOutcome::Exhausted
    );

    let outcome = h.desk.filter().set_filter(Some(CategoryId(5))).await.unwrap();

    assert!(matches!(outcome, Some(LoadOutcome::Loaded { appended: 3, .. })));
    assert_eq!(h.desk.filter().selected(), Some(CategoryId(5)));
    assert_eq!(h.desk.events().filter(), Some(CategoryId(5)));
    let ids: Vec<i64> = h.desk.events().items().iter().map(|e| e.id.get()).collect();
    assert_eq!(ids, vec![50, 51, 52]);
    assert_eq!(
        h.backend.calls().last(),
        Some(&Call::Events(PageQuery::new(0, 9).with_category(Some(CategoryId(5)))))
    );
}

#[tokio::test]
async fn selecting_the_current_filter_is_a_no_op() {
    let h = Harness::signed_in(FakeBackend::with_events(4), USER);
    h.desk.events().initialize(None).await.unwrap();
    h.backend.clear_calls();

    assert_eq!(h.desk.filter().set_filter(None).await.unwrap(), None);
    assert!(h.backend.calls().is_empty());
}

#[tokio::test]
async fn returning_to_a_cached_filter_hydrates_without_fetching() {
    let backend = FakeBackend::with_events(4);
    backend.set_events(Some(CategoryId(5)), (50..53).map(summary).collect());
    let h = Harness::signed_in(backend, USER);
    h.desk.filter().set_filter(Some(CategoryId(5))).await.unwrap();
    h.desk.filter().set_filter(None).await.unwrap();
    h.backend.clear_calls();

    let outcome = h.desk.filter().set_filter(Some(CategoryId(5))).await.unwrap();

    assert!(matches!(outcome, Some(LoadOutcome::Hydrated { items: 3 })));
    assert!(h.backend.calls().is_empty());
}

#[tokio::test]
async fn categories_are_served_from_cache_after_first_load() {
    let backend = FakeBackend::new();
    backend.set_categories(categories());
    let h = Harness::signed_in(backend, USER);

    assert_eq!(h.desk.filter().categories().await.unwrap(), categories());
    assert_eq!(h.desk.filter().categories().await.unwrap(), categories());

    assert_eq!(h.backend.count(|c| *c == Call::Categories), 1);
    assert!(
        h.cache
            .read("home-page-categories-ada@example.com")
            .is_some()
    );
}

#[tokio::test]
async fn empty_cached_category_list_is_refetched() {
    let h = Harness::signed_in(FakeBackend::new(), USER);

    assert!(h.desk.filter().categories().await.unwrap().is_empty());
    h.backend.set_categories(categories());
    assert_eq!(h.desk.filter().categories().await.unwrap().len(), 2);

    assert_eq!(h.backend.count(|c| *c == Call::Categories), 2);
}

#[tokio::test]
async fn resolve_accepts_ids_and_titles() {
    let backend = FakeBackend::new();
    backend.set_categories(categories());
    let h = Harness::signed_in(backend, USER);

    assert_eq!(h.desk.filter().resolve("5").await.unwrap(), CategoryId(5));
    assert_eq!(h.desk.filter().resolve("music").await.unwrap(), CategoryId(1));
    assert!(h.desk.filter().resolve("Sports").await.is_err());
}

#[tokio::test]
async fn sign_out_forgets_the_selection() {
    let backend = FakeBackend::with_events(4);
    backend.set_events(Some(CategoryId(5)), (50..53).map(summary).collect());
    let h = Harness::signed_in(backend, USER);
    h.desk.filter().set_filter(Some(CategoryId(5))).await.unwrap();

    h.desk.sign_out();

    assert_eq!(h.desk.filter().selected(), None);
}
