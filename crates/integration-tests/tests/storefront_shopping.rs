//! Integration tests for the storefront shopping flow.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database
//! - Both servers running (cargo run -p luxora-storefront / luxora-admin)
//! - `LUXORA_ADMIN_EMAIL` and `LUXORA_ADMIN_PASSWORD` for an admin account
//!
//! Run with: cargo test -p luxora-integration-tests -- --ignored --test-threads=1

use luxora_integration_tests::{
    add_to_cart, admin_url, apply_as_merchant, approve, assert_money, checkout, client,
    create_product, create_product_from, expect_json, login_admin, money, open_store, place_order,
    product_body, register_customer, storefront_url,
};
use reqwest::StatusCode;
use serde_json::json;

// ============================================================================
// Health & Auth
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_storefront_health() {
    let resp = client()
        .get(format!("{}/health", storefront_url()))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_cart_requires_session() {
    let resp = client()
        .get(format!("{}/api/cart", storefront_url()))
        .send()
        .await
        .expect("Failed to get cart");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_register_then_me() {
    let shopper = client();
    let user = register_customer(&shopper).await;
    assert_eq!(user["role"], "CUSTOMER");

    let resp = shopper
        .get(format!("{}/api/auth/me", storefront_url()))
        .send()
        .await
        .expect("Failed to get me");
    let me = expect_json(resp, StatusCode::OK).await;
    assert_eq!(me["email"], user["email"]);

    let resp = shopper
        .post(format!("{}/api/auth/logout", storefront_url()))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = shopper
        .get(format!("{}/api/auth/me", storefront_url()))
        .send()
        .await
        .expect("Failed to get me");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Catalog visibility
// ============================================================================

#[tokio::test]
#[ignore = "Requires running servers, database and admin credentials"]
async fn test_pending_store_products_are_hidden() {
    let admin = client();
    login_admin(&admin).await;

    let applicant = apply_as_merchant(&client()).await;
    let product = create_product(&admin, applicant.merchant_id, "80.00", 4).await;
    let slug = product["slug"].as_str().expect("slug");

    let resp = client()
        .get(format!("{}/api/products/{slug}", storefront_url()))
        .send()
        .await
        .expect("Failed to get product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running servers, database and admin credentials"]
async fn test_archived_product_leaves_catalog() {
    let admin = client();
    login_admin(&admin).await;
    let listing = open_store(&admin, "45.00", 3).await;
    let id = listing.product["id"].as_i64().expect("id");
    let slug = listing.product["slug"].as_str().expect("slug");

    let resp = client()
        .get(format!("{}/api/products/{slug}", storefront_url()))
        .send()
        .await
        .expect("Failed to get product");
    let detail = expect_json(resp, StatusCode::OK).await;
    assert_eq!(detail["merchantId"], listing.merchant.merchant_id);

    let resp = admin
        .delete(format!("{}/api/admin/products/{id}", admin_url()))
        .send()
        .await
        .expect("Failed to archive");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client()
        .get(format!("{}/api/products/{slug}", storefront_url()))
        .send()
        .await
        .expect("Failed to get product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Cart & Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running servers, database and admin credentials"]
async fn test_cart_totals_and_free_shipping() {
    let admin = client();
    login_admin(&admin).await;
    let listing = open_store(&admin, "300.00", 10).await;
    let product_id = listing.product["id"].as_i64().expect("id");

    let shopper = client();
    register_customer(&shopper).await;

    let resp = shopper
        .post(format!("{}/api/cart", storefront_url()))
        .json(&json!({ "productId": product_id, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add to cart");
    let cart = expect_json(resp, StatusCode::CREATED).await;
    // 300 is under the free shipping threshold
    assert!(money(&cart["totals"]["shipping"]) > 0.0);

    let item_id = cart["items"][0]["id"].as_i64().expect("item id");
    let resp = shopper
        .put(format!("{}/api/cart", storefront_url()))
        .json(&json!({ "itemId": item_id, "quantity": 2 }))
        .send()
        .await
        .expect("Failed to update cart");
    let cart = expect_json(resp, StatusCode::OK).await;

    let totals = &cart["totals"];
    assert_eq!(totals["itemCount"], 2);
    assert!((money(&totals["subtotal"]) - 600.0).abs() < 0.001);
    assert!((money(&totals["tax"]) - 48.0).abs() < 0.001);
    assert!(money(&totals["shipping"]).abs() < 0.001);
    assert!((money(&totals["total"]) - 648.0).abs() < 0.001);
}

#[tokio::test]
#[ignore = "Requires running servers, database and admin credentials"]
async fn test_cart_quantity_is_clamped_to_stock() {
    let admin = client();
    login_admin(&admin).await;
    let listing = open_store(&admin, "20.00", 3).await;
    let product_id = listing.product["id"].as_i64().expect("id");

    let shopper = client();
    register_customer(&shopper).await;

    let resp = shopper
        .post(format!("{}/api/cart", storefront_url()))
        .json(&json!({ "productId": product_id, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add to cart");
    let cart = expect_json(resp, StatusCode::CREATED).await;
    let item_id = cart["items"][0]["id"].as_i64().expect("item id");

    let resp = shopper
        .put(format!("{}/api/cart", storefront_url()))
        .json(&json!({ "itemId": item_id, "quantity": 50 }))
        .send()
        .await
        .expect("Failed to update cart");
    let cart = expect_json(resp, StatusCode::OK).await;
    assert_eq!(cart["items"][0]["quantity"], 3);
}

#[tokio::test]
#[ignore = "Requires running servers, database and admin credentials"]
async fn test_checkout_decrements_stock_and_clears_cart() {
    let admin = client();
    login_admin(&admin).await;
    let listing = open_store(&admin, "120.00", 5).await;
    let product_id = listing.product["id"].as_i64().expect("id");
    let slug = listing.product["slug"].as_str().expect("slug");

    let shopper = client();
    register_customer(&shopper).await;
    let order = place_order(&shopper, product_id, 2).await;

    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["items"].as_array().map(Vec::len), Some(1));
    assert!(
        order["orderNumber"]
            .as_str()
            .is_some_and(|n| !n.is_empty())
    );

    let resp = client()
        .get(format!("{}/api/products/{slug}", storefront_url()))
        .send()
        .await
        .expect("Failed to get product");
    let detail = expect_json(resp, StatusCode::OK).await;
    assert_eq!(detail["stock"], 3);

    let resp = shopper
        .get(format!("{}/api/cart", storefront_url()))
        .send()
        .await
        .expect("Failed to get cart");
    let cart = expect_json(resp, StatusCode::OK).await;
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));

    let number = order["orderNumber"].as_str().expect("order number");
    let resp = shopper
        .get(format!("{}/api/account/orders/{number}", storefront_url()))
        .send()
        .await
        .expect("Failed to get order");
    let detail = expect_json(resp, StatusCode::OK).await;
    assert_eq!(detail["id"], order["id"]);
}

#[tokio::test]
#[ignore = "Requires running servers, database and admin credentials"]
async fn test_wishlist_toggle() {
    let admin = client();
    login_admin(&admin).await;
    let listing = open_store(&admin, "60.00", 2).await;
    let product_id = listing.product["id"].as_i64().expect("id");

    let shopper = client();
    register_customer(&shopper).await;

    for expected in [true, false] {
        let resp = shopper
            .post(format!("{}/api/wishlist", storefront_url()))
            .json(&json!({ "productId": product_id }))
            .send()
            .await
            .expect("Failed to toggle");
        let body = expect_json(resp, StatusCode::OK).await;
        assert_eq!(body["wishlisted"], expected);
    }
}

// ============================================================================
// Variants & Discounts
// ============================================================================

/// An approved store selling a two-color scarf.
async fn two_color_scarf(admin: &reqwest::Client, stock: i32) -> serde_json::Value {
    let merchant = apply_as_merchant(&client()).await;
    approve(admin, merchant.merchant_id).await;
    let mut body = product_body(merchant.merchant_id, "40.00", stock);
    body["colors"] = json!(["Ivory", "Noir"]);
    create_product_from(admin, &body).await
}

#[tokio::test]
#[ignore = "Requires running servers, database and admin credentials"]
async fn test_color_spelling_merges_into_one_line() {
    let admin = client();
    login_admin(&admin).await;
    let product = two_color_scarf(&admin, 5).await;
    let product_id = product["id"].as_i64().expect("id");

    let shopper = client();
    register_customer(&shopper).await;

    expect_json(
        add_to_cart(&shopper, product_id, 1, Some("noir")).await,
        StatusCode::CREATED,
    )
    .await;
    let cart = expect_json(
        add_to_cart(&shopper, product_id, 1, Some("Noir")).await,
        StatusCode::CREATED,
    )
    .await;

    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(cart["items"][0]["selectedColor"], "Noir");
    assert_eq!(cart["items"][0]["quantity"], 2);
}

#[tokio::test]
#[ignore = "Requires running servers, database and admin credentials"]
async fn test_colors_of_one_product_share_stock_in_cart() {
    let admin = client();
    login_admin(&admin).await;
    let product = two_color_scarf(&admin, 5).await;
    let product_id = product["id"].as_i64().expect("id");

    let shopper = client();
    register_customer(&shopper).await;

    expect_json(
        add_to_cart(&shopper, product_id, 3, Some("Ivory")).await,
        StatusCode::CREATED,
    )
    .await;
    let resp = add_to_cart(&shopper, product_id, 3, Some("Noir")).await;
    let body = expect_json(resp, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["error"], "only 5 left in stock");

    expect_json(
        add_to_cart(&shopper, product_id, 2, Some("Noir")).await,
        StatusCode::CREATED,
    )
    .await;
}

#[tokio::test]
#[ignore = "Requires running servers, database and admin credentials"]
async fn test_checkout_checks_stock_across_colors() {
    let admin = client();
    login_admin(&admin).await;
    let product = two_color_scarf(&admin, 5).await;
    let product_id = product["id"].as_i64().expect("id");
    let slug = product["slug"].as_str().expect("slug");

    let shopper = client();
    register_customer(&shopper).await;
    for color in ["Ivory", "Noir"] {
        expect_json(
            add_to_cart(&shopper, product_id, 2, Some(color)).await,
            StatusCode::CREATED,
        )
        .await;
    }

    // Stock drops to 3 while 4 units sit in the cart across two lines.
    let mut body = product_body(product["merchantId"].as_i64().expect("merchant"), "40.00", 3);
    body["name"] = product["name"].clone();
    body["colors"] = json!(["Ivory", "Noir"]);
    let resp = admin
        .put(format!("{}/api/admin/products/{product_id}", admin_url()))
        .json(&body)
        .send()
        .await
        .expect("Failed to update product");
    expect_json(resp, StatusCode::OK).await;

    let body = expect_json(checkout(&shopper).await, StatusCode::BAD_REQUEST).await;
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|e| e.contains("only 3 left in stock")),
        "{body}"
    );

    let resp = client()
        .get(format!("{}/api/products/{slug}", storefront_url()))
        .send()
        .await
        .expect("Failed to get product");
    let detail = expect_json(resp, StatusCode::OK).await;
    assert_eq!(detail["stock"], 3);

    let resp = shopper
        .get(format!("{}/api/cart", storefront_url()))
        .send()
        .await
        .expect("Failed to get cart");
    let cart = expect_json(resp, StatusCode::OK).await;
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
#[ignore = "Requires running servers, database and admin credentials"]
async fn test_discounted_checkout_totals() {
    let admin = client();
    login_admin(&admin).await;
    let merchant = apply_as_merchant(&client()).await;
    approve(&admin, merchant.merchant_id).await;
    let mut body = product_body(merchant.merchant_id, "100.00", 5);
    body["discountPercent"] = json!(20);
    let product = create_product_from(&admin, &body).await;

    let shopper = client();
    register_customer(&shopper).await;
    let order = place_order(&shopper, product["id"].as_i64().expect("id"), 2).await;

    // 200.00 - 40.00 discount + 16.00 tax (8% of 200) + 25.00 shipping
    assert_money(&order["subtotal"], 200.0);
    assert_money(&order["discount"], 40.0);
    assert_money(&order["tax"], 16.0);
    assert_money(&order["shipping"], 25.0);
    assert_money(&order["total"], 201.0);
    assert_eq!(order["shipping"], "25.00");
    assert_money(&order["items"][0]["lineDiscount"], 40.0);
}
