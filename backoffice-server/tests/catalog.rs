//! Categories and products: counter maintenance, reference checks,
//! restrict-delete and image lifecycle.

mod common;

use backoffice_server::ErrorCode;
use backoffice_server::db::repository::count_referencing;
use backoffice_server::services::image_host::HostCall;
use common::{TestApp, doc, png, test_app};
use serde_json::json;
use shared::models::{Category, Product};

const MISSING_ID: &str = "0123456789abcdef01234567";

#[tokio::test]
async fn product_create_and_delete_adjust_category_count() {
    let app = test_app().await;
    let drinks = app.category("Drinks").await;
    assert_eq!(drinks.count, 0);

    let products = app.state.service::<Product>();
    let latte = products
        .create(doc(json!({"name": "Latte", "price": 3.5, "category": drinks.id})), None)
        .await
        .unwrap();
    assert_eq!(app.category_count(&drinks.id).await, 1);

    let mocha = products
        .create(doc(json!({"name": "Mocha", "price": "4", "category": drinks.id})), None)
        .await
        .unwrap();
    assert_eq!(mocha.price, 4.0);
    assert_eq!(app.category_count(&drinks.id).await, 2);

    products.delete(&latte.id).await.unwrap();
    products.delete(&mocha.id).await.unwrap();
    assert_eq!(app.category_count(&drinks.id).await, 0);
}

#[tokio::test]
async fn reassigning_category_moves_the_count() {
    let app = test_app().await;
    let x = app.category("Coffee").await;
    let y = app.category("Tea").await;
    let products = app.state.service::<Product>();

    let product = products
        .create(doc(json!({"name": "Chai", "price": 3, "category": x.id})), None)
        .await
        .unwrap();
    assert_eq!(app.category_count(&x.id).await, 1);

    let moved = products
        .update(&product.id, doc(json!({"category": y.id})), None)
        .await
        .unwrap();
    assert_eq!(moved.category, y.id);
    assert_eq!(app.category_count(&x.id).await, 0);
    assert_eq!(app.category_count(&y.id).await, 1);

    // Same category again leaves both counters alone
    products
        .update(&product.id, doc(json!({"category": y.id, "name": "Masala Chai"})), None)
        .await
        .unwrap();
    assert_eq!(app.category_count(&x.id).await, 0);
    assert_eq!(app.category_count(&y.id).await, 1);
}

#[tokio::test]
async fn unknown_category_is_rejected_before_any_write() {
    let app = test_app().await;
    let drinks = app.category("Drinks").await;
    let products = app.state.service::<Product>();

    let err = products
        .create(doc(json!({"name": "Ghost", "price": 1, "category": MISSING_ID})), Some(png("g.png")))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CategoryInvalid);
    assert!(products.list().await.unwrap().is_empty());
    assert!(app.host.calls().await.is_empty());

    let product = products
        .create(doc(json!({"name": "Latte", "price": 3, "category": drinks.id})), None)
        .await
        .unwrap();
    let err = products
        .update(&product.id, doc(json!({"category": MISSING_ID})), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CategoryInvalid);
    assert_eq!(app.category_count(&drinks.id).await, 1);
}

#[tokio::test]
async fn product_fields_are_validated() {
    let app = test_app().await;
    let drinks = app.category("Drinks").await;
    let products = app.state.service::<Product>();

    let err = products
        .create(doc(json!({"name": "Tea", "price": -1, "category": drinks.id})), None)
        .await
        .unwrap_err();
    assert_eq!(err.message, "\"price\" must be greater than or equal to 0");

    let err = products
        .create(doc(json!({"name": "Te", "price": 1, "category": drinks.id})), None)
        .await
        .unwrap_err();
    assert_eq!(err.message, "\"name\" length must be at least 3 characters long");

    let err = products
        .create(doc(json!({"name": "Tea", "price": 1, "category": "abc"})), None)
        .await
        .unwrap_err();
    assert_eq!(err.message, "\"category\" length must be 24 characters long");

    let err = products
        .create(doc(json!({"name": "Tea", "price": 1})), None)
        .await
        .unwrap_err();
    assert_eq!(err.message, "\"category\" is required");
    assert_eq!(err.code, ErrorCode::ValidationFailed);
}

#[tokio::test]
async fn category_with_products_cannot_be_deleted() {
    let app = test_app().await;
    let drinks = app.category("Drinks").await;
    let products = app.state.service::<Product>();
    let categories = app.state.service::<Category>();

    let latte = products
        .create(doc(json!({"name": "Latte", "price": 3, "category": drinks.id})), None)
        .await
        .unwrap();

    let err = categories.delete(&drinks.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::CategoryHasProducts);
    assert_eq!(err.details.unwrap()["count"], json!(1));
    assert!(categories.get(&drinks.id).await.is_ok());

    products.delete(&latte.id).await.unwrap();
    categories.delete(&drinks.id).await.unwrap();
    assert_eq!(
        categories.get(&drinks.id).await.unwrap_err().code,
        ErrorCode::CategoryNotFound
    );
}

#[tokio::test]
async fn category_names_are_unique() {
    let app = test_app().await;
    let drinks = app.category("Drinks").await;
    let food = app.category("Food").await;
    let categories = app.state.service::<Category>();

    let err = categories
        .create(doc(json!({"name": "Drinks"})), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CategoryNameExists);

    let err = categories
        .update(&food.id, doc(json!({"name": "Drinks"})), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CategoryNameExists);

    // Renaming to its own name is not a conflict
    let same = categories
        .update(&drinks.id, doc(json!({"name": "Drinks"})), None)
        .await
        .unwrap();
    assert_eq!(same.name, "Drinks");
    assert_eq!(categories.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_twice_is_not_found_both_times() {
    let app = test_app().await;
    let drinks = app.category("Drinks").await;
    let products = app.state.service::<Product>();
    let latte = products
        .create(doc(json!({"name": "Latte", "price": 3, "category": drinks.id})), None)
        .await
        .unwrap();

    products.delete(&latte.id).await.unwrap();
    for _ in 0..2 {
        let err = products.delete(&latte.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);
    }
    assert_eq!(app.category_count(&drinks.id).await, 0);
}

#[tokio::test]
async fn replacing_an_image_deletes_the_old_one_first() {
    let app = test_app().await;
    let drinks = app.category("Drinks").await;
    let products = app.state.service::<Product>();

    let product = products
        .create(
            doc(json!({"name": "Latte", "price": 3, "category": drinks.id})),
            Some(png("a.png")),
        )
        .await
        .unwrap();
    let a = product.image.clone().unwrap();

    let updated = products
        .update(&product.id, doc(json!({})), Some(png("b.png")))
        .await
        .unwrap();
    let b = updated.image.clone().unwrap();

    assert_ne!(a.public_id, b.public_id);
    assert_eq!(
        app.host.calls().await,
        vec![
            HostCall::Upload(a.public_id.clone()),
            HostCall::Destroy(a.public_id.clone()),
            HostCall::Upload(b.public_id.clone()),
        ]
    );
    assert_eq!(products.get(&product.id).await.unwrap().image, Some(b));
}

#[tokio::test]
async fn update_without_file_keeps_the_image() {
    let app = test_app().await;
    let drinks = app.category("Drinks").await;
    let products = app.state.service::<Product>();

    let product = products
        .create(
            doc(json!({"name": "Latte", "price": 3, "category": drinks.id})),
            Some(png("a.png")),
        )
        .await
        .unwrap();

    let updated = products
        .update(&product.id, doc(json!({"price": 4})), None)
        .await
        .unwrap();
    assert_eq!(updated.price, 4.0);
    assert_eq!(updated.image, product.image);
    let asset = product.image.unwrap();
    assert_eq!(app.host.calls().await, vec![HostCall::Upload(asset.public_id)]);
}

#[tokio::test]
async fn deleting_a_product_releases_its_image() {
    let app = test_app().await;
    let drinks = app.category("Drinks").await;
    let products = app.state.service::<Product>();

    let product = products
        .create(
            doc(json!({"name": "Latte", "price": 3, "category": drinks.id})),
            Some(png("a.png")),
        )
        .await
        .unwrap();
    let asset = product.image.clone().unwrap();

    products.delete(&product.id).await.unwrap();
    assert!(!app.host.contains(&asset.public_id).await);
}

#[tokio::test]
async fn failed_image_release_is_surfaced_after_the_delete() {
    let app = test_app().await;
    let drinks = app.category("Drinks").await;
    let products = app.state.service::<Product>();

    let product = products
        .create(
            doc(json!({"name": "Latte", "price": 3, "category": drinks.id})),
            Some(png("a.png")),
        )
        .await
        .unwrap();

    app.host.fail_destroys(true);
    let err = products.delete(&product.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ImageHostError);
    assert_eq!(err.http_status().as_u16(), 500);

    // The record and its counter are already gone
    assert_eq!(
        products.get(&product.id).await.unwrap_err().code,
        ErrorCode::ProductNotFound
    );
    assert_eq!(app.category_count(&drinks.id).await, 0);
}

#[tokio::test]
async fn failed_upload_creates_nothing() {
    let app = test_app().await;
    let drinks = app.category("Drinks").await;
    let products = app.state.service::<Product>();

    app.host.fail_uploads(true);
    let err = products
        .create(
            doc(json!({"name": "Latte", "price": 3, "category": drinks.id})),
            Some(png("a.png")),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ImageHostError);
    assert!(products.list().await.unwrap().is_empty());
    assert_eq!(app.category_count(&drinks.id).await, 0);
}

#[tokio::test]
async fn products_are_listed_with_their_category() {
    let app = test_app().await;
    let drinks = app.category("Drinks").await;
    let products = app.state.service::<Product>();
    products
        .create(doc(json!({"name": "Latte", "price": 3, "category": drinks.id})), None)
        .await
        .unwrap();

    let listed = backoffice_server::db::repository::product::with_categories(
        &app.state.db,
        products.list().await.unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(listed.len(), 1);
    let category = listed[0].category.clone().unwrap();
    assert_eq!(category.name, "Drinks");
    assert_eq!(category.count, 1);
}

/// Stored counter equals the number of products actually pointing at the category
async fn assert_count_matches(app: &TestApp, category: &str) -> i64 {
    let stored = app.category_count(category).await;
    let actual = count_referencing(&app.state.db, "product", "category", category)
        .await
        .unwrap();
    assert_eq!(stored, actual, "count drifted for category {category}");
    stored
}

async fn assert_counts(app: &TestApp, categories: &[String]) {
    for id in categories {
        assert_count_matches(app, id).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_in_one_category_all_land() {
    const N: usize = 24;
    let app = test_app().await;
    let drinks = app.category("Drinks").await;
    let products = app.state.service::<Product>();

    let tasks: Vec<_> = (0..N)
        .map(|i| {
            let products = products.clone();
            let category = drinks.id.clone();
            tokio::spawn(async move {
                products
                    .create(doc(json!({"name": format!("Drink {i:02}"), "price": 1, "category": category})), None)
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(products.list().await.unwrap().len(), N);
    assert_eq!(assert_count_matches(&app, &drinks.id).await, N as i64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reassignments_move_every_product() {
    const N: usize = 12;
    let app = test_app().await;
    let x = app.category("Coffee").await;
    let y = app.category("Tea").await;
    let products = app.state.service::<Product>();

    let mut ids = Vec::new();
    for i in 0..N {
        let product = products
            .create(doc(json!({"name": format!("Cup {i:02}"), "price": 2, "category": x.id})), None)
            .await
            .unwrap();
        ids.push(product.id);
    }
    assert_eq!(app.category_count(&x.id).await, N as i64);

    let tasks: Vec<_> = ids
        .into_iter()
        .map(|id| {
            let products = products.clone();
            let target = y.id.clone();
            tokio::spawn(async move { products.update(&id, doc(json!({"category": target})), None).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(assert_count_matches(&app, &x.id).await, 0);
    assert_eq!(assert_count_matches(&app, &y.id).await, N as i64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_moves_of_one_product_keep_counts_exact() {
    let app = test_app().await;
    let x = app.category("Coffee").await;
    let y = app.category("Tea").await;
    let z = app.category("Juice").await;
    let products = app.state.service::<Product>();
    let product = products
        .create(doc(json!({"name": "Mug", "price": 2, "category": x.id})), None)
        .await
        .unwrap();

    let tasks: Vec<_> = [y.id.clone(), z.id.clone()]
        .into_iter()
        .map(|target| {
            let products = products.clone();
            let id = product.id.clone();
            tokio::spawn(async move { products.update(&id, doc(json!({"category": target})), None).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let moved = products.get(&product.id).await.unwrap();
    assert!(moved.category == y.id || moved.category == z.id);
    assert_eq!(assert_count_matches(&app, &x.id).await, 0);
    let landed = assert_count_matches(&app, &y.id).await + assert_count_matches(&app, &z.id).await;
    assert_eq!(landed, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_deletes_decrement_once() {
    let app = test_app().await;
    let drinks = app.category("Drinks").await;
    let products = app.state.service::<Product>();
    let product = products
        .create(doc(json!({"name": "Latte", "price": 3, "category": drinks.id})), None)
        .await
        .unwrap();

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let products = products.clone();
            let id = product.id.clone();
            tokio::spawn(async move { products.delete(&id).await })
        })
        .collect();
    let mut deleted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => deleted += 1,
            Err(e) => assert_eq!(e.code, ErrorCode::ProductNotFound),
        }
    }

    assert!(deleted >= 1);
    assert_eq!(assert_count_matches(&app, &drinks.id).await, 0);
}

#[tokio::test]
async fn count_tracks_a_mixed_sequence_of_writes() {
    let app = test_app().await;
    let a = app.category("Coffee").await;
    let b = app.category("Tea").await;
    let c = app.category("Juice").await;
    let all = [a.id.clone(), b.id.clone(), c.id.clone()];
    let products = app.state.service::<Product>();

    let p1 = products
        .create(doc(json!({"name": "Espresso", "price": 2, "category": a.id})), None)
        .await
        .unwrap();
    assert_counts(&app, &all).await;
    let p2 = products
        .create(doc(json!({"name": "Green Tea", "price": 2, "category": b.id})), None)
        .await
        .unwrap();
    assert_counts(&app, &all).await;
    let p3 = products
        .create(doc(json!({"name": "Orange", "price": 2, "category": a.id})), None)
        .await
        .unwrap();
    assert_counts(&app, &all).await;

    products.update(&p3.id, doc(json!({"category": c.id})), None).await.unwrap();
    assert_counts(&app, &all).await;
    products.update(&p1.id, doc(json!({"category": b.id})), None).await.unwrap();
    assert_counts(&app, &all).await;
    products.update(&p1.id, doc(json!({"price": 3})), None).await.unwrap();
    assert_counts(&app, &all).await;
    products.delete(&p2.id).await.unwrap();
    assert_counts(&app, &all).await;
    products.update(&p1.id, doc(json!({"category": a.id})), None).await.unwrap();
    assert_counts(&app, &all).await;
    products.delete(&p3.id).await.unwrap();
    assert_counts(&app, &all).await;

    assert_eq!(app.category_count(&a.id).await, 1);
    assert_eq!(app.category_count(&b.id).await, 0);
    assert_eq!(app.category_count(&c.id).await, 0);
}
