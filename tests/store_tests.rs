//! Store behavior against the in-memory backend: hydration, optimistic
//! reconciliation, rollback policies and session teardown.

use listinha::backend::memory::{MemoryBackend, Op};
use listinha::backend::{AuthEvent, Backend, Table};
use listinha::core::{SessionPhase, Store};
use listinha::models::{DEFAULT_LIST_NAME, ItemPatch, RecordId};
use serde_json::json;
use std::sync::Arc;

const EPS: f64 = 1e-9;

async fn ready_store() -> (Arc<MemoryBackend>, Store<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    backend.seed_session("tester@example.com").await;
    let store = Store::new(backend.clone());
    assert!(store.bootstrap().await.unwrap());
    (backend, store)
}

#[tokio::test]
async fn bootstrap_creates_the_default_list() {
    let (backend, store) = ready_store().await;

    let state = store.snapshot().await;
    assert_eq!(state.phase, SessionPhase::Ready);
    let list = state.current_list.expect("list after hydration");
    assert_eq!(list.name, DEFAULT_LIST_NAME);
    assert!(!list.id.is_local());

    // exactly one remote list row was created
    assert_eq!(backend.rows(Table::ShoppingLists).await.len(), 1);
}

#[tokio::test]
async fn bootstrap_without_session_stays_unauthenticated() {
    let backend = Arc::new(MemoryBackend::new());
    let store = Store::new(backend);
    assert!(!store.bootstrap().await.unwrap());
    assert_eq!(store.snapshot().await.phase, SessionPhase::Unauthenticated);
}

#[tokio::test]
async fn hydration_tolerates_a_failing_items_step() {
    let backend = Arc::new(MemoryBackend::new());
    backend.seed_session("partial@example.com").await;
    backend.inject_failure(Table::Items, Op::Query).await;

    let store = Store::new(backend);
    assert!(store.bootstrap().await.unwrap());

    let state = store.snapshot().await;
    assert_eq!(state.phase, SessionPhase::Ready);
    assert!(state.current_list.is_some());
    assert!(state.items.is_empty());
}

#[tokio::test]
async fn optimistic_add_replaces_the_placeholder() {
    let (backend, store) = ready_store().await;
    let category = store.add_category("Groceries").await.unwrap();
    assert!(!category.id.is_local());

    let item = store
        .add_item("Milk", "5,50", &category.id, None, None)
        .await
        .unwrap();
    assert!(!item.id.is_local());
    assert!((item.price - 5.5).abs() < EPS);

    // no placeholder survives anywhere in local state
    let state = store.snapshot().await;
    assert!(state.categories.iter().all(|c| !c.id.is_local()));
    assert!(state.items.iter().all(|i| !i.id.is_local()));
    assert_eq!(state.items.len(), 1);

    // the remote row carries the same server id
    let rows = backend.rows(Table::Items).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("id").and_then(|v| v.as_str()),
        item.id.server()
    );
}

#[tokio::test]
async fn failed_add_leaves_no_trace() {
    let (backend, store) = ready_store().await;
    let category = store.add_category("Groceries").await.unwrap();

    backend.inject_failure(Table::Items, Op::Insert).await;
    let result = store.add_item("Milk", "5,50", &category.id, None, None).await;
    assert!(result.is_err());

    let state = store.snapshot().await;
    assert!(state.items.is_empty());
    assert!((state.stats.grand_total - 0.0).abs() < EPS);
    assert!(backend.rows(Table::Items).await.is_empty());
}

#[tokio::test]
async fn milk_moves_from_pending_to_paid() {
    let (_backend, store) = ready_store().await;
    let groceries = store.add_category("Groceries").await.unwrap();
    let milk = store
        .add_item("Milk", "5,50", &groceries.id, None, None)
        .await
        .unwrap();

    let state = store.snapshot().await;
    let stats = state.stats.category(&groceries.id);
    assert!((state.stats.grand_total - 5.5).abs() < EPS);
    assert!((stats.pending - 5.5).abs() < EPS);
    assert!((stats.paid - 0.0).abs() < EPS);

    assert!(store.toggle_item(&milk.id).await.unwrap());

    let state = store.snapshot().await;
    let stats = state.stats.category(&groceries.id);
    assert!((stats.total - 5.5).abs() < EPS);
    assert!((stats.paid - 5.5).abs() < EPS);
    assert!((stats.pending - 0.0).abs() < EPS);
}

#[tokio::test]
async fn update_normalizes_price_and_survives_backend_failure() {
    let (backend, store) = ready_store().await;
    let category = store.add_category("Electronics").await.unwrap();
    let item = store
        .add_item("Monitor", "10,00", &category.id, None, None)
        .await
        .unwrap();

    backend.inject_failure(Table::Items, Op::Update).await;
    store
        .update_item(
            &item.id,
            ItemPatch {
                price: Some("1.200,50".into()),
                ..ItemPatch::default()
            },
        )
        .await
        .unwrap();

    // local state advanced despite the remote failure (accepted gap)
    let state = store.snapshot().await;
    assert!((state.items[0].price - 1200.5).abs() < EPS);
    assert!((state.stats.grand_total - 1200.5).abs() < EPS);
    let remote_price = backend.rows(Table::Items).await[0]
        .get("price")
        .and_then(|v| v.as_f64())
        .unwrap();
    assert!((remote_price - 10.0).abs() < EPS);
}

#[tokio::test]
async fn delete_item_is_local_first() {
    let (backend, store) = ready_store().await;
    let category = store.add_category("Groceries").await.unwrap();
    let item = store
        .add_item("Bread", "3,00", &category.id, None, None)
        .await
        .unwrap();

    backend.inject_failure(Table::Items, Op::Delete).await;
    store.delete_item(&item.id).await.unwrap();

    let state = store.snapshot().await;
    assert!(state.items.is_empty());
    assert!((state.stats.grand_total - 0.0).abs() < EPS);
    // the remote row survives the failed delete (accepted gap)
    assert_eq!(backend.rows(Table::Items).await.len(), 1);
}

#[tokio::test]
async fn category_delete_falls_back_to_explicit_cascade() {
    let (backend, store) = ready_store().await;
    let groceries = store.add_category("Groceries").await.unwrap();
    store
        .add_item("Milk", "5,50", &groceries.id, None, None)
        .await
        .unwrap();
    store
        .add_item("Eggs", "8,00", &groceries.id, None, None)
        .await
        .unwrap();

    // primary cascading delete fails once; the fallback path succeeds
    backend.inject_failure(Table::Categories, Op::Delete).await;
    store.delete_category(&groceries.id).await.unwrap();

    let state = store.snapshot().await;
    assert!(state.categories.is_empty());
    assert!(state.items.is_empty());
    assert!(backend.rows(Table::Categories).await.is_empty());
    assert!(backend.rows(Table::Items).await.is_empty());
}

#[tokio::test]
async fn category_delete_restores_the_snapshot_when_everything_fails() {
    let (backend, store) = ready_store().await;
    let groceries = store.add_category("Groceries").await.unwrap();
    let other = store.add_category("Pharmacy").await.unwrap();
    store
        .add_item("Milk", "5,50", &groceries.id, None, None)
        .await
        .unwrap();
    store
        .add_item("Aspirin", "4,00", &other.id, None, None)
        .await
        .unwrap();
    let before = store.snapshot().await;

    // both the cascade and the fallback fail
    backend.inject_failure(Table::Categories, Op::Delete).await;
    backend.inject_failure(Table::Items, Op::DeleteWhere).await;
    assert!(store.delete_category(&groceries.id).await.is_err());

    // local collections come back exactly: same ids, same field values
    let after = store.snapshot().await;
    assert_eq!(after.categories.len(), before.categories.len());
    for (a, b) in after.categories.iter().zip(before.categories.iter()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.name, b.name);
    }
    assert_eq!(after.items.len(), before.items.len());
    for (a, b) in after.items.iter().zip(before.items.iter()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.name, b.name);
        assert!((a.price - b.price).abs() < EPS);
        assert_eq!(a.category_id, b.category_id);
        assert_eq!(a.completed, b.completed);
    }
    // no surviving item references a missing category
    for item in &after.items {
        assert!(after.categories.iter().any(|c| c.id == item.category_id));
    }
    assert!((after.stats.grand_total - before.stats.grand_total).abs() < EPS);
}

#[tokio::test]
async fn unknown_category_rejects_items() {
    let (_backend, store) = ready_store().await;
    let bogus = RecordId::from("no-such-category");
    assert!(
        store
            .add_item("Ghost", "1,00", &bogus, None, None)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn messages_hydrate_in_timestamp_order() {
    let backend = Arc::new(MemoryBackend::new());
    let user = backend.seed_session("chat@example.com").await;
    let list = backend
        .seed(
            Table::ShoppingLists,
            json!({
                "name": "Casa",
                "createdAt": "2026-01-02T10:00:00Z",
                "ownerId": user.id,
            }),
        )
        .await;
    let list_id = list.get("id").unwrap().as_str().unwrap().to_string();
    // seeded newest first on purpose; hydration orders ascending
    backend
        .seed(
            Table::Messages,
            json!({
                "text": "second",
                "senderId": user.id,
                "listId": list_id,
                "timestamp": "2026-01-02T11:00:00Z",
                "senderEmail": user.email,
            }),
        )
        .await;
    backend
        .seed(
            Table::Messages,
            json!({
                "text": "first",
                "senderId": user.id,
                "listId": list_id,
                "timestamp": "2026-01-02T10:30:00Z",
                "senderEmail": user.email,
            }),
        )
        .await;

    let store = Store::new(backend);
    assert!(store.bootstrap().await.unwrap());

    let state = store.snapshot().await;
    let texts: Vec<&str> = state.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, ["first", "second"]);

    let sent = store.add_message("third").await.unwrap();
    assert!(!sent.id.is_local());
    let state = store.snapshot().await;
    assert_eq!(state.messages.last().unwrap().text, "third");
}

#[tokio::test]
async fn sign_out_clears_everything_at_once() {
    let (_backend, store) = ready_store().await;
    let groceries = store.add_category("Groceries").await.unwrap();
    store
        .add_item("Milk", "5,50", &groceries.id, None, None)
        .await
        .unwrap();
    store.add_message("oi").await.unwrap();

    store.sign_out().await.unwrap();

    let state = store.snapshot().await;
    assert_eq!(state.phase, SessionPhase::Unauthenticated);
    assert!(state.user.is_none());
    assert!(state.current_list.is_none());
    assert!(state.categories.is_empty());
    assert!(state.items.is_empty());
    assert!(state.messages.is_empty());
    assert!(state.stats.per_category.is_empty());
    assert!((state.stats.grand_total - 0.0).abs() < EPS);
}

#[tokio::test]
async fn auth_events_drive_the_session() {
    let backend = Arc::new(MemoryBackend::new());
    let user = backend.seed_session("events@example.com").await;
    let store = Store::new(backend);

    store.handle_auth_event(AuthEvent::SignedIn(user)).await;
    assert_eq!(store.snapshot().await.phase, SessionPhase::Ready);

    store.handle_auth_event(AuthEvent::SignedOut).await;
    let state = store.snapshot().await;
    assert_eq!(state.phase, SessionPhase::Unauthenticated);
    assert!(state.current_list.is_none());
}

/// Yield to the bridge task until `check` passes or the attempt
/// budget runs out.
async fn wait_for(store: &Store<MemoryBackend>, check: impl Fn(SessionPhase) -> bool) -> bool {
    for _ in 0..200 {
        if check(store.snapshot().await.phase) {
            return true;
        }
        tokio::task::yield_now().await;
    }
    false
}

#[tokio::test]
async fn broadcast_sign_out_tears_the_session_down() {
    let backend = Arc::new(MemoryBackend::new());
    backend.seed_session("live@example.com").await;
    let store = Store::new(backend.clone());
    assert!(store.bootstrap().await.unwrap());
    let bridge = store.attach_auth_events();

    let groceries = store.add_category("Groceries").await.unwrap();
    store
        .add_item("Milk", "5,50", &groceries.id, None, None)
        .await
        .unwrap();

    // the backend signs out on its own; the store must observe the
    // broadcast and reset without any direct call
    backend.sign_out().await.unwrap();
    assert!(wait_for(&store, |phase| phase == SessionPhase::Unauthenticated).await);

    let state = store.snapshot().await;
    assert!(state.user.is_none());
    assert!(state.current_list.is_none());
    assert!(state.categories.is_empty());
    assert!(state.items.is_empty());
    assert!((state.stats.grand_total - 0.0).abs() < EPS);

    bridge.abort();
}

#[tokio::test]
async fn broadcast_sign_in_hydrates_the_store() {
    let backend = Arc::new(MemoryBackend::new());
    let store = Store::new(backend.clone());
    assert!(!store.bootstrap().await.unwrap());
    let bridge = store.attach_auth_events();

    // signing up at the backend broadcasts SignedIn; the bridge must
    // drive hydration, including the default list creation
    backend
        .sign_up("fresh@example.com", "secret1")
        .await
        .unwrap();
    assert!(wait_for(&store, |phase| phase == SessionPhase::Ready).await);

    let state = store.snapshot().await;
    assert_eq!(
        state.user.as_ref().map(|u| u.email.as_str()),
        Some("fresh@example.com")
    );
    assert_eq!(
        state.current_list.as_ref().map(|l| l.name.as_str()),
        Some(DEFAULT_LIST_NAME)
    );

    bridge.abort();
}

#[tokio::test]
async fn archived_lists_exclude_the_active_one() {
    let backend = Arc::new(MemoryBackend::new());
    let user = backend.seed_session("old@example.com").await;
    backend
        .seed(
            Table::ShoppingLists,
            json!({
                "name": "Natal 2025",
                "createdAt": "2025-12-01T08:00:00Z",
                "ownerId": user.id,
            }),
        )
        .await;
    let old = backend
        .seed(
            Table::ShoppingLists,
            json!({
                "name": "Churrasco",
                "createdAt": "2025-10-10T08:00:00Z",
                "ownerId": user.id,
            }),
        )
        .await;
    let old_id = old.get("id").unwrap().as_str().unwrap().to_string();
    backend
        .seed(
            Table::Items,
            json!({
                "name": "Carvão",
                "price": "25,00",
                "categoryId": "cat-1",
                "ownerId": user.id,
                "listId": old_id,
                "completed": 1,
            }),
        )
        .await;

    let store = Store::new(backend);
    assert!(store.bootstrap().await.unwrap());

    // "Natal 2025" is the newest list, so it is the active one
    let state = store.snapshot().await;
    assert_eq!(state.current_list.as_ref().unwrap().name, "Natal 2025");

    let archived = store.fetch_archived_lists().await.unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].name, "Churrasco");

    // prices stored as locale text come back canonical
    let items = store.fetch_list_items(&archived[0].id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert!((items[0].price - 25.0).abs() < EPS);
    assert!(items[0].completed);
}

#[tokio::test]
async fn password_reset_needs_a_known_account() {
    let (_backend, store) = ready_store().await;
    assert!(
        store
            .request_password_reset("tester@example.com", None)
            .await
            .is_ok()
    );
    // the redirect target is advisory; backends may ignore it
    assert!(
        store
            .request_password_reset("tester@example.com", Some("listinha://reset"))
            .await
            .is_ok()
    );
    assert!(
        store
            .request_password_reset("nobody@example.com", None)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn update_password_enforces_the_minimum_length() {
    let (_backend, store) = ready_store().await;
    assert!(store.update_password("abc").await.is_err());
    assert!(store.update_password("long-enough").await.is_ok());
}
