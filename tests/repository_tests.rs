//! Integration tests against a real Postgres instance.
//!
//! These run the schema migrations and exercise PostgresRepository end to end.
//! They are ignored by default; provide DATABASE_URL and run
//! `cargo test -- --ignored` to include them.

use resto_portal::{
    auth,
    models::{CreateRestaurantRequest, CreateUserRequest, UpdateRestaurantRequest, UpdateUserRequest},
    repository::{PostgresRepository, Repository},
};
use sqlx::PgPool;
use std::time::{SystemTime, UNIX_EPOCH};

// --- Test Context and Setup ---

struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

/// Per-run marker so repeated test runs never collide on names or unique emails.
fn unique_marker() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{:x}", nanos)
}

fn restaurant_request(name: &str, category_ids: Vec<i64>) -> CreateRestaurantRequest {
    CreateRestaurantRequest {
        name: name.to_string(),
        description: "昔ながらの定食屋".to_string(),
        lowest_price: 1000,
        highest_price: 3000,
        postal_code: "460-0008".to_string(),
        address: "愛知県名古屋市中区栄3-1-1".to_string(),
        opening_time: "10:00:00".parse().unwrap(),
        closing_time: "21:30:00".parse().unwrap(),
        seating_capacity: 40,
        category_ids,
    }
}

// --- Tests ---

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_category_crud_lifecycle() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let marker = unique_marker();

    // Create: the exact (non-ASCII) name round-trips.
    let name = format!("テスト-{marker}");
    let created = repo.create_category(name.clone()).await.unwrap();
    assert_eq!(created.name, name);

    let page = repo
        .list_categories(Some(marker.clone()), 1)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, created.id);

    // Update: same identifier, new name; the old name drops out of results.
    let renamed = format!("テスト2-{marker}");
    let updated = repo
        .update_category(created.id, renamed.clone())
        .await
        .unwrap()
        .expect("row must still exist");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, renamed);

    let found = repo.find_category(created.id).await.unwrap().unwrap();
    assert_eq!(found.name, renamed);

    // Destroy: the row disappears from subsequent lookups.
    assert!(repo.delete_category(created.id).await.unwrap());
    assert!(repo.find_category(created.id).await.unwrap().is_none());
    let after = repo.list_categories(Some(marker), 1).await.unwrap();
    assert_eq!(after.total, 0);

    // Deleting the same identifier again does not silently succeed.
    assert!(!repo.delete_category(created.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_listing_pagination_and_total() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let marker = unique_marker();

    for i in 0..16 {
        repo.create_category(format!("page-{marker}-{i:02}"))
            .await
            .unwrap();
    }

    let first = repo
        .list_categories(Some(format!("page-{marker}")), 1)
        .await
        .unwrap();
    assert_eq!(first.items.len(), 15);
    assert_eq!(first.total, 16);
    assert_eq!(first.per_page, 15);

    let second = repo
        .list_categories(Some(format!("page-{marker}")), 2)
        .await
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.total, 16);

    // Cleanup
    for category in first.items.iter().chain(second.items.iter()) {
        repo.delete_category(category.id).await.unwrap();
    }
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_restaurant_category_association_sync() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let marker = unique_marker();

    let washoku = repo
        .create_category(format!("和食-{marker}"))
        .await
        .unwrap();
    let teishoku = repo
        .create_category(format!("定食-{marker}"))
        .await
        .unwrap();

    // Create with one association.
    let restaurant = repo
        .create_restaurant(restaurant_request(
            &format!("名古屋食堂-{marker}"),
            vec![washoku.id],
        ))
        .await
        .unwrap();

    let linked = repo.restaurants_for_category(washoku.id).await.unwrap();
    assert!(linked.iter().any(|r| r.id == restaurant.id));
    assert!(
        repo.restaurants_for_category(teishoku.id)
            .await
            .unwrap()
            .is_empty()
    );

    // Update replaces the association set wholesale.
    let update = UpdateRestaurantRequest {
        name: restaurant.name.clone(),
        description: restaurant.description.clone(),
        lowest_price: restaurant.lowest_price,
        highest_price: restaurant.highest_price,
        postal_code: restaurant.postal_code.clone(),
        address: restaurant.address.clone(),
        opening_time: restaurant.opening_time,
        closing_time: restaurant.closing_time,
        seating_capacity: restaurant.seating_capacity,
        category_ids: vec![teishoku.id],
    };
    repo.update_restaurant(restaurant.id, update)
        .await
        .unwrap()
        .expect("restaurant must still exist");

    assert!(
        repo.restaurants_for_category(washoku.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        repo.restaurants_for_category(teishoku.id)
            .await
            .unwrap()
            .iter()
            .any(|r| r.id == restaurant.id)
    );

    // Deleting the restaurant cascades the join rows away.
    assert!(repo.delete_restaurant(restaurant.id).await.unwrap());
    assert!(
        repo.restaurants_for_category(teishoku.id)
            .await
            .unwrap()
            .is_empty()
    );

    repo.delete_category(washoku.id).await.unwrap();
    repo.delete_category(teishoku.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_user_lifecycle_and_credential_lookup() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let marker = unique_marker();

    let email = format!("taro-{marker}@example.com");
    let hash = auth::hash_password("nagoyameshi").unwrap();
    let created = repo
        .create_user(
            CreateUserRequest {
                name: "山田太郎".to_string(),
                email: email.clone(),
                password: "nagoyameshi".to_string(),
                postal_code: Some("460-0008".to_string()),
                address: None,
                phone_number: None,
            },
            hash.clone(),
        )
        .await
        .unwrap();

    // The credential lookup path used by web_login.
    let by_email = repo.find_user_by_email(&email).await.unwrap().unwrap();
    assert_eq!(by_email.id, created.id);
    assert!(auth::verify_password("nagoyameshi", &by_email.password).unwrap());

    // Update without a password keeps the stored hash.
    let updated = repo
        .update_user(
            created.id,
            UpdateUserRequest {
                name: "山田次郎".to_string(),
                email: email.clone(),
                password: None,
                postal_code: None,
                address: None,
                phone_number: None,
            },
            None,
        )
        .await
        .unwrap()
        .expect("row must still exist");
    assert_eq!(updated.name, "山田次郎");
    assert_eq!(updated.password, hash);

    assert!(repo.delete_user(created.id).await.unwrap());
    assert!(repo.find_user(created.id).await.unwrap().is_none());
    assert!(!repo.delete_user(created.id).await.unwrap());
}
