//! SQLite backend behavior: the generic row surface, foreign-key
//! cascades and session persistence across process boundaries.

use listinha::backend::sqlite::SqliteBackend;
use listinha::backend::{Backend, BackendError, Filter, Mutation, Table};
use serde_json::json;

#[tokio::test]
async fn insert_query_update_delete_round_trip() {
    let backend = SqliteBackend::open_in_memory().unwrap();

    let row = backend
        .mutate(
            Table::Categories,
            Mutation::Insert(json!({"name": "Groceries", "ownerId": "u1"})),
        )
        .await
        .unwrap()
        .expect("inserted row");
    let id = row["id"].as_str().unwrap().to_string();
    assert_eq!(row["name"], "Groceries");

    let rows = backend
        .query(Table::Categories, &Filter::new().eq("ownerId", "u1"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);

    let updated = backend
        .mutate(
            Table::Categories,
            Mutation::Update {
                id: id.clone(),
                patch: json!({"name": "Mercado"}),
            },
        )
        .await
        .unwrap()
        .expect("updated row");
    assert_eq!(updated["name"], "Mercado");

    backend
        .mutate(Table::Categories, Mutation::Delete { id })
        .await
        .unwrap();
    let rows = backend
        .query(Table::Categories, &Filter::new().eq("ownerId", "u1"))
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn updating_a_missing_row_is_an_error() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    let result = backend
        .mutate(
            Table::Items,
            Mutation::Update {
                id: "no-such-row".into(),
                patch: json!({"completed": true}),
            },
        )
        .await;
    assert!(matches!(result, Err(BackendError::NotFound(_))));
}

#[tokio::test]
async fn deleting_a_category_cascades_to_its_items() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    let category = backend
        .mutate(
            Table::Categories,
            Mutation::Insert(json!({"name": "Groceries", "ownerId": "u1"})),
        )
        .await
        .unwrap()
        .unwrap();
    let category_id = category["id"].as_str().unwrap().to_string();

    for name in ["Milk", "Eggs"] {
        backend
            .mutate(
                Table::Items,
                Mutation::Insert(json!({
                    "name": name,
                    "price": 1.0,
                    "categoryId": category_id,
                    "ownerId": "u1",
                    "listId": "l1",
                    "completed": false,
                })),
            )
            .await
            .unwrap();
    }

    backend
        .mutate(Table::Categories, Mutation::Delete { id: category_id })
        .await
        .unwrap();

    let items = backend
        .query(Table::Items, &Filter::new().eq("listId", "l1"))
        .await
        .unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn ordering_and_limit_pick_the_newest_list() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    for (name, created) in [
        ("old", "2025-10-10T08:00:00+00:00"),
        ("new", "2025-12-01T08:00:00+00:00"),
    ] {
        backend
            .mutate(
                Table::ShoppingLists,
                Mutation::Insert(json!({
                    "name": name,
                    "createdAt": created,
                    "ownerId": "u1",
                })),
            )
            .await
            .unwrap();
    }

    let rows = backend
        .query(
            Table::ShoppingLists,
            &Filter::new()
                .eq("ownerId", "u1")
                .order_by("createdAt", false)
                .limit(1),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "new");
}

#[tokio::test]
async fn session_survives_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("listinha.sqlite");
    let session_file = dir.path().join("listinha.session");

    let first = SqliteBackend::open(&db, Some(session_file.clone())).unwrap();
    let session = first.sign_up("ana@example.com", "secret1").await.unwrap();
    drop(first);

    // a new instance restores the session from the cached token
    let second = SqliteBackend::open(&db, Some(session_file.clone())).unwrap();
    let restored = second
        .current_session()
        .await
        .unwrap()
        .expect("persisted session");
    assert_eq!(restored.user.id, session.user.id);
    assert_eq!(restored.user.email, "ana@example.com");

    second.sign_out().await.unwrap();

    let third = SqliteBackend::open(&db, Some(session_file)).unwrap();
    assert!(third.current_session().await.unwrap().is_none());
}

#[tokio::test]
async fn sign_up_rejects_duplicates_and_weak_passwords() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    backend.sign_up("ana@example.com", "secret1").await.unwrap();

    assert!(matches!(
        backend.sign_up("ana@example.com", "secret2").await,
        Err(BackendError::EmailTaken(_))
    ));
    assert!(matches!(
        backend.sign_up("other@example.com", "abc").await,
        Err(BackendError::WeakPassword(_))
    ));
    assert!(matches!(
        backend.sign_in_with_password("ana@example.com", "wrong").await,
        Err(BackendError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn recovery_tokens_are_single_use() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    backend.sign_up("rec@example.com", "secret1").await.unwrap();
    backend.sign_out().await.unwrap();

    let token = backend.issue_recovery_token("rec@example.com").await.unwrap();
    let session = backend.redeem_recovery_token(&token).await.unwrap();
    assert_eq!(session.user.email, "rec@example.com");

    assert!(matches!(
        backend.redeem_recovery_token(&token).await,
        Err(BackendError::NotFound(_))
    ));
}
