//! PostgreSQL credential store tests.
//!
//! Need a disposable database: `DATABASE_URL=postgres://... cargo test -- --ignored`.

use std::sync::Arc;

use fintrack_core::auth::AuthError;
use fintrack_core::auth::queries::PgCredentialStore;
use fintrack_core::auth::store::CredentialStore;
use fintrack_core::models::auth::CredentialUpdate;
use sqlx::postgres::PgPoolOptions;

async fn store() -> PgCredentialStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for pg tests");
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&url)
        .await
        .expect("connect to PG");
    fintrack_core::migrate::migrate(&pool)
        .await
        .expect("run migrations");
    PgCredentialStore::new(pool)
}

fn unique_email(tag: &str) -> String {
    format!("{tag}-{}@example.test", uuid::Uuid::now_v7())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn create_find_update_roundtrip() {
    let store = store().await;
    store.ping().await.expect("ping");

    let email = unique_email("roundtrip");
    let created = store.create("ana", &email, "hash-1").await.unwrap();

    let found = store.find_by_email(&email).await.unwrap().unwrap();
    assert_eq!(found.user, created.user);
    assert_eq!(found.password_hash, "hash-1");

    let updated = store
        .update_fields(
            created.id(),
            CredentialUpdate {
                password_hash: Some("hash-2".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.user.username, "ana");
    assert_eq!(updated.password_hash, "hash-2");

    let err = store
        .update_fields(uuid::Uuid::now_v7(), CredentialUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::NotFound));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_duplicate_registrations_leave_one_row() {
    let store = Arc::new(store().await);
    let email = unique_email("race");

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        let email = email.clone();
        handles.push(tokio::spawn(async move {
            store.create(&format!("user{i}"), &email, "hash").await
        }));
    }

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(AuthError::DuplicateEmail) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(ok, 1);
}
