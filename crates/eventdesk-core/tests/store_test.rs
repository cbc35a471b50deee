#![allow(clippy::unwrap_used)]
// Paginated store behaviour against the scripted backend.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use common::{Call, Failure, FakeBackend, Harness, Op, summary};
use eventdesk_core::{
    CategoryId, EventId, LoadOutcome, LocalCache, MemoryCache, NotificationKind, PageQuery,
    SessionState,
};

const USER: &str = "ada@example.com";

fn ids(items: &[eventdesk_core::EventSummary]) -> Vec<i64> {
    items.iter().map(|e| e.id.get()).collect()
}

// ── Loading ─────────────────────────────────────────────────────────

#[tokio::test]
async fn loads_concatenate_pages_without_duplicates() {
    let h = Harness::signed_in(FakeBackend::with_events(30), USER);
    let events = h.desk.events();

    events.initialize(None).await.unwrap();
    assert_eq!(ids(&events.items()), (1..=9).collect::<Vec<_>>());

    // A new event lands at the head server-side, shifting event 9 onto page 1.
    h.backend.set_events(None, (0..=30).map(summary).collect());

    let outcome = events.load_next_page().await.unwrap();
    assert_eq!(
        outcome,
        LoadOutcome::Loaded {
            appended: 8,
            exhausted: false
        }
    );
    assert_eq!(ids(&events.items()), (1..=17).collect::<Vec<_>>());
}

#[tokio::test]
async fn load_while_loading_sends_nothing() {
    let h = Harness::signed_in(FakeBackend::with_events(30), USER);
    let events = h.desk.events();
    let gate = h.backend.stall();

    let first = events.load_next_page();
    let second = async {
        tokio::task::yield_now().await;
        assert!(events.is_loading());
        let outcome = events.load_next_page().await;
        gate.notify_one();
        outcome
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(second.unwrap(), LoadOutcome::InFlight);
    assert!(matches!(first.unwrap(), LoadOutcome::Loaded { appended: 9, .. }));
    assert_eq!(h.backend.event_fetches(), 1);
}

#[tokio::test]
async fn short_page_ends_pagination() {
    let h = Harness::signed_in(FakeBackend::with_events(13), USER);
    let events = h.desk.events();

    events.initialize(None).await.unwrap();
    let outcome = events.load_next_page().await.unwrap();

    assert_eq!(
        outcome,
        LoadOutcome::Loaded {
            appended: 4,
            exhausted: true
        }
    );
    assert_eq!(events.items().len(), 13);
    assert!(!events.has_more());

    h.backend.clear_calls();
    assert_eq!(events.load_next_page().await.unwrap(), LoadOutcome::Exhausted);
    assert_eq!(events.load_next_page().await.unwrap(), LoadOutcome::Exhausted);
    assert_eq!(h.backend.event_fetches(), 0);
}

#[tokio::test]
async fn exhausted_store_stays_quiet_until_reset() {
    let h = Harness::signed_in(FakeBackend::with_events(4), USER);
    h.backend
        .set_events(Some(CategoryId(5)), (100..105).map(summary).collect());
    let events = h.desk.events();

    events.initialize(None).await.unwrap();
    assert!(!events.has_more());
    h.backend.clear_calls();

    events.load_next_page().await.unwrap();
    assert_eq!(h.backend.event_fetches(), 0);

    let outcome = events.reset_for_filter(Some(CategoryId(5))).await.unwrap();
    assert!(matches!(outcome, LoadOutcome::Loaded { appended: 5, .. }));
    assert_eq!(
        h.backend.calls(),
        vec![Call::Events(
            PageQuery::new(0, 9).with_category(Some(CategoryId(5)))
        )]
    );
    assert_eq!(ids(&events.items()), vec![100, 101, 102, 103, 104]);
}

#[tokio::test]
async fn second_initialize_is_a_no_op() {
    let h = Harness::signed_in(FakeBackend::with_events(30), USER);
    let events = h.desk.events();

    events.initialize(None).await.unwrap();
    assert_eq!(events.initialize(None).await.unwrap(), LoadOutcome::Ready);
    assert_eq!(h.backend.event_fetches(), 1);
}

// ── Failure policy ──────────────────────────────────────────────────

#[tokio::test]
async fn failed_load_keeps_cursor_and_notifies() {
    let h = Harness::signed_in(FakeBackend::with_events(30), USER);
    let events = h.desk.events();
    let mut notifications = h.desk.notifier().subscribe();

    events.initialize(None).await.unwrap();
    h.backend.fail(Op::Events, Failure::Network);

    let err = events.load_next_page().await.unwrap_err();
    assert!(err.is_retryable());

    let snapshot = events.snapshot();
    assert_eq!(snapshot.next_page, 1);
    assert!(snapshot.has_more);
    assert!(!snapshot.loading);
    assert_eq!(snapshot.items.len(), 9);
    assert_eq!(
        notifications.recv().await.unwrap().kind,
        NotificationKind::LoadFailed
    );

    h.backend.heal(Op::Events);
    h.backend.clear_calls();
    events.load_next_page().await.unwrap();
    assert_eq!(h.backend.calls(), vec![Call::Events(PageQuery::new(1, 9))]);
    assert_eq!(events.items().len(), 18);
}

#[tokio::test]
async fn failed_bootstrap_is_retried_by_initialize() {
    let h = Harness::signed_in(FakeBackend::with_events(5), USER);
    let events = h.desk.events();

    h.backend.fail(Op::Events, Failure::Network);
    assert!(events.initialize(None).await.is_err());

    h.backend.heal(Op::Events);
    let outcome = events.initialize(None).await.unwrap();
    assert!(matches!(outcome, LoadOutcome::Loaded { appended: 5, .. }));
}

#[tokio::test]
async fn auth_failure_ends_the_session() {
    let h = Harness::signed_in(FakeBackend::with_events(30), USER);
    let events = h.desk.events();
    events.initialize(None).await.unwrap();
    assert!(!h.cache.is_empty());

    h.backend.fail(Op::Events, Failure::Auth);
    let err = events.load_next_page().await.unwrap_err();

    assert!(err.ends_session());
    assert_eq!(h.desk.session().state(), SessionState::Expired);
    assert!(h.cache.is_empty());
    assert!(!h.backend.has_token());
    assert!(events.items().is_empty());
}

// ── Liveness ────────────────────────────────────────────────────────

#[tokio::test]
async fn results_after_close_are_discarded() {
    let h = Harness::signed_in(FakeBackend::with_events(30), USER);
    let events = h.desk.events();
    let gate = h.backend.stall();

    let load = events.load_next_page();
    let unmount = async {
        tokio::task::yield_now().await;
        h.desk.close();
        gate.notify_one();
    };
    let (outcome, ()) = tokio::join!(load, unmount);

    assert_eq!(outcome.unwrap(), LoadOutcome::Discarded);
    assert!(events.items().is_empty());
    assert!(h.cache.keys_with_prefix("home-page-events").is_empty());
}

#[tokio::test]
async fn results_after_reset_are_discarded() {
    let backend = FakeBackend::with_events(30);
    backend.set_events(Some(CategoryId(2)), (200..203).map(summary).collect());
    let h = Harness::signed_in(backend, USER);
    let events = h.desk.events();
    let gate = h.backend.stall();

    let stale = events.load_next_page();
    let reset = async {
        tokio::task::yield_now().await;
        h.backend.unstall();
        let outcome = events.reset_for_filter(Some(CategoryId(2))).await;
        gate.notify_one();
        outcome
    };
    let (stale, reset) = tokio::join!(stale, reset);

    assert_eq!(stale.unwrap(), LoadOutcome::Discarded);
    assert!(matches!(reset.unwrap(), LoadOutcome::Loaded { appended: 3, .. }));
    assert_eq!(ids(&events.items()), vec![200, 201, 202]);
}

// ── Cache ───────────────────────────────────────────────────────────

#[tokio::test]
async fn cache_round_trip_restores_sequence_cursor_and_has_more() {
    let backend = FakeBackend::with_events(30);
    let cache = Arc::new(MemoryCache::new());

    let first = Harness::with_cache(Arc::clone(&backend), Arc::clone(&cache));
    first.desk.resume(common::tokens_for(USER, "USER")).unwrap();
    first.desk.events().initialize(None).await.unwrap();
    first.desk.events().load_next_page().await.unwrap();
    let before = first.desk.events().snapshot();

    let second = Harness::with_cache(Arc::clone(&backend), cache);
    second.desk.resume(common::tokens_for(USER, "USER")).unwrap();
    backend.clear_calls();

    let outcome = second.desk.events().initialize(None).await.unwrap();
    let after = second.desk.events().snapshot();

    assert_eq!(outcome, LoadOutcome::Hydrated { items: 18 });
    assert_eq!(after.items, before.items);
    assert_eq!(after.next_page, 2);
    assert!(after.has_more);
    assert_eq!(backend.event_fetches(), 0);
}

#[tokio::test]
async fn legacy_bare_array_hydrates_with_derived_cursor() {
    let h = Harness::signed_in(FakeBackend::with_events(30), USER);
    let legacy: Vec<_> = (1..=10).map(summary).collect();
    h.cache.write(
        "home-page-events-ada@example.com",
        serde_json::to_string(&legacy).unwrap(),
    );

    let events = h.desk.events();
    assert_eq!(
        events.initialize(None).await.unwrap(),
        LoadOutcome::Hydrated { items: 10 }
    );
    assert_eq!(events.snapshot().next_page, 2);

    events.load_next_page().await.unwrap();
    assert_eq!(h.backend.calls(), vec![Call::Events(PageQuery::new(2, 9))]);
}

#[tokio::test]
async fn corrupt_cache_entry_is_a_miss() {
    let h = Harness::signed_in(FakeBackend::with_events(3), USER);
    h.cache
        .write("home-page-events-ada@example.com", "{\"items\": [".into());

    let outcome = h.desk.events().initialize(None).await.unwrap();

    assert!(matches!(outcome, LoadOutcome::Loaded { appended: 3, .. }));
    assert_eq!(h.backend.event_fetches(), 1);
}

#[tokio::test]
async fn nothing_is_persisted_without_a_user() {
    let h = Harness::new(FakeBackend::with_events(3));

    h.desk.events().initialize(None).await.unwrap();

    assert_eq!(h.desk.events().items().len(), 3);
    assert!(h.cache.is_empty());
}

#[tokio::test]
async fn filtered_pages_use_their_own_key() {
    let backend = FakeBackend::with_events(3);
    backend.set_events(Some(CategoryId(5)), vec![summary(50)]);
    let h = Harness::signed_in(backend, USER);

    h.desk.events().initialize(Some(CategoryId(5))).await.unwrap();

    assert!(h
        .cache
        .read("home-page-events-ada@example.com-category-5")
        .is_some());
    assert!(h.cache.read("home-page-events-ada@example.com").is_none());
}

// ── New events ──────────────────────────────────────────────────────

#[tokio::test]
async fn new_events_are_staged_then_shown_at_the_head() {
    let h = Harness::signed_in(FakeBackend::with_events(5), USER);
    let events = h.desk.events();
    events.initialize(None).await.unwrap();

    let mut fresh = vec![summary(90), summary(91)];
    fresh.extend((1..=5).map(summary));
    h.backend.set_events(None, fresh);

    assert_eq!(events.check_for_new().await.unwrap(), 2);
    assert_eq!(events.snapshot().staged, 2);
    assert_eq!(events.items().len(), 5, "staged items are not shown yet");

    assert_eq!(events.show_new(), 2);
    assert_eq!(ids(&events.items()), vec![90, 91, 1, 2, 3, 4, 5]);
    assert_eq!(events.snapshot().staged, 0);

    let cached = h.cache.read("home-page-events-ada@example.com").unwrap();
    assert!(cached.starts_with("{\"items\":[{\"id\":90"));
}

// ── Session boundaries ──────────────────────────────────────────────

#[tokio::test]
async fn switching_accounts_drops_previous_users_pages() {
    let h = Harness::signed_in(FakeBackend::with_events(3), USER);
    h.desk.events().initialize(None).await.unwrap();
    assert!(h.cache.read("home-page-events-ada@example.com").is_some());

    h.desk
        .resume(common::tokens_for("bob@example.com", "USER"))
        .unwrap();

    assert!(h.cache.read("home-page-events-ada@example.com").is_none());
    assert!(h.desk.events().items().is_empty());
    assert!(!h.desk.events().is_initialized());
    assert!(h.desk.events().find(EventId(1)).is_none());
}

#[tokio::test]
async fn subscribers_see_loaded_pages() {
    let h = Harness::signed_in(FakeBackend::with_events(3), USER);
    let events = h.desk.events();
    let mut stream = events.subscribe();

    events.initialize(None).await.unwrap();

    let latest = stream.latest();
    assert_eq!(latest.items.len(), 3);
    assert!(!latest.has_more);
    assert!(!latest.loading);
}
