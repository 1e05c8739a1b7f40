//! Integration tests for the admin and merchant dashboards.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database
//! - Both servers running (cargo run -p luxora-storefront / luxora-admin)
//! - `LUXORA_ADMIN_EMAIL` and `LUXORA_ADMIN_PASSWORD` for an admin account
//!
//! Run with: cargo test -p luxora-integration-tests -- --ignored --test-threads=1

use luxora_integration_tests::{
    TEST_PASSWORD, admin_url, apply_as_merchant, approve, assert_money, client,
    create_product_from, expect_json, login_admin, login_staff, open_store, place_order,
    product_body, register_customer, shipping_address, storefront_url, unique_name,
};
use reqwest::StatusCode;
use serde_json::json;

// ============================================================================
// Auth & Access
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_admin_health_and_headers() {
    let resp = client()
        .get(format!("{}/health", admin_url()))
        .send()
        .await
        .expect("Failed to reach admin");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("no-store")
    );
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
#[ignore = "Requires running servers and database"]
async fn test_customer_cannot_sign_in_to_dashboards() {
    let shopper = client();
    let user = register_customer(&shopper).await;
    let email = user["email"].as_str().expect("email");

    let resp = client()
        .post(format!("{}/api/auth/login", admin_url()))
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_wrong_password_is_unauthorized() {
    let applicant = apply_as_merchant(&client()).await;

    let resp = client()
        .post(format!("{}/api/auth/login", admin_url()))
        .json(&json!({ "email": applicant.email, "password": "not-the-password" }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_pending_merchant_uses_own_dashboard_only() {
    let applicant = apply_as_merchant(&client()).await;
    let merchant = client();
    let session = login_staff(&merchant, &applicant.email, TEST_PASSWORD).await;
    assert_eq!(session["role"], "MERCHANT");
    assert_eq!(session["merchantStatus"], "PENDING");
    assert_eq!(session["merchantId"], applicant.merchant_id);

    let resp = merchant
        .get(format!("{}/api/merchant/dashboard/stats", admin_url()))
        .send()
        .await
        .expect("Failed to get stats");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = merchant
        .get(format!("{}/api/admin/dashboard/stats", admin_url()))
        .send()
        .await
        .expect("Failed to get stats");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running servers, database and admin credentials"]
async fn test_suspended_merchant_is_locked_out() {
    let admin = client();
    login_admin(&admin).await;

    let applicant = apply_as_merchant(&client()).await;
    let merchant = client();
    login_staff(&merchant, &applicant.email, TEST_PASSWORD).await;

    let resp = admin
        .delete(format!(
            "{}/api/admin/merchants/{}",
            admin_url(),
            applicant.merchant_id
        ))
        .send()
        .await
        .expect("Failed to suspend");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // The existing session is rejected on its next request
    let resp = merchant
        .get(format!("{}/api/merchant/products", admin_url()))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Merchant lifecycle
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server, database and admin credentials"]
async fn test_invalid_merchant_transition_conflicts() {
    let admin = client();
    login_admin(&admin).await;
    let applicant = apply_as_merchant(&client()).await;
    approve(&admin, applicant.merchant_id).await;

    let resp = admin
        .post(format!(
            "{}/api/admin/merchants/{}/status",
            admin_url(),
            applicant.merchant_id
        ))
        .json(&json!({ "status": "PENDING" }))
        .send()
        .await
        .expect("Failed to change status");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_duplicate_merchant_application_conflicts() {
    let applicant = apply_as_merchant(&client()).await;

    let resp = client()
        .post(format!("{}/api/merchant/register", admin_url()))
        .json(&json!({
            "email": applicant.email,
            "name": "Second Try",
            "password": TEST_PASSWORD,
            "storeName": unique_name("Atelier"),
            "storeEmail": applicant.email,
        }))
        .send()
        .await
        .expect("Failed to apply");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

// ============================================================================
// Merchant scope
// ============================================================================

#[tokio::test]
#[ignore = "Requires running servers, database and admin credentials"]
async fn test_merchant_cannot_touch_other_stores_products() {
    let admin = client();
    login_admin(&admin).await;
    let other = open_store(&admin, "90.00", 5).await;
    let other_id = other.product["id"].as_i64().expect("id");

    let applicant = apply_as_merchant(&client()).await;
    let merchant = client();
    login_staff(&merchant, &applicant.email, TEST_PASSWORD).await;

    let resp = merchant
        .get(format!("{}/api/merchant/products/{other_id}", admin_url()))
        .send()
        .await
        .expect("Failed to get product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = merchant
        .delete(format!("{}/api/merchant/products/{other_id}", admin_url()))
        .send()
        .await
        .expect("Failed to archive product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_merchant_creates_product_in_own_store() {
    let applicant = apply_as_merchant(&client()).await;
    let merchant = client();
    login_staff(&merchant, &applicant.email, TEST_PASSWORD).await;

    let resp = merchant
        .post(format!("{}/api/merchant/products", admin_url()))
        .json(&json!({
            "merchantId": 1,
            "name": unique_name("Wool Coat"),
            "category": "Outerwear",
            "price": "450.00",
            "stock": 2,
            "featured": true,
        }))
        .send()
        .await
        .expect("Failed to create product");
    let product = expect_json(resp, StatusCode::CREATED).await;
    assert_eq!(product["merchantId"], applicant.merchant_id);
    assert_eq!(product["featured"], false);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_settings_partial_update() {
    let applicant = apply_as_merchant(&client()).await;
    let merchant = client();
    login_staff(&merchant, &applicant.email, TEST_PASSWORD).await;

    let resp = merchant
        .get(format!("{}/api/merchant/settings", admin_url()))
        .send()
        .await
        .expect("Failed to get settings");
    let before = expect_json(resp, StatusCode::OK).await;

    let resp = merchant
        .put(format!("{}/api/merchant/settings", admin_url()))
        .json(&json!({ "processingDays": 4, "notifyReviews": false }))
        .send()
        .await
        .expect("Failed to update settings");
    let after = expect_json(resp, StatusCode::OK).await;
    assert_eq!(after["processingDays"], 4);
    assert_eq!(after["notifyReviews"], false);
    assert_eq!(after["name"], before["name"]);
    assert_eq!(after["payoutSchedule"], before["payoutSchedule"]);

    let resp = merchant
        .put(format!("{}/api/merchant/settings", admin_url()))
        .json(&json!({ "payoutSchedule": "hourly" }))
        .send()
        .await
        .expect("Failed to update settings");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
#[ignore = "Requires running servers, database and admin credentials"]
async fn test_cancel_restocks_and_blocks_further_changes() {
    let admin = client();
    login_admin(&admin).await;
    let listing = open_store(&admin, "150.00", 4).await;
    let product_id = listing.product["id"].as_i64().expect("id");
    let slug = listing.product["slug"].as_str().expect("slug");

    let shopper = client();
    register_customer(&shopper).await;
    let order = place_order(&shopper, product_id, 3).await;
    let order_id = order["id"].as_i64().expect("order id");

    let resp = admin
        .put(format!("{}/api/admin/orders/{order_id}/status", admin_url()))
        .json(&json!({ "status": "CANCELLED" }))
        .send()
        .await
        .expect("Failed to cancel");
    let cancelled = expect_json(resp, StatusCode::OK).await;
    assert_eq!(cancelled["status"], "CANCELLED");

    let resp = client()
        .get(format!("{}/api/products/{slug}", storefront_url()))
        .send()
        .await
        .expect("Failed to get product");
    let detail = expect_json(resp, StatusCode::OK).await;
    assert_eq!(detail["stock"], 4);

    let resp = admin
        .put(format!("{}/api/admin/orders/{order_id}/status", admin_url()))
        .json(&json!({ "status": "SHIPPED" }))
        .send()
        .await
        .expect("Failed to ship");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running servers, database and admin credentials"]
async fn test_merchant_sees_only_own_order_lines() {
    let admin = client();
    login_admin(&admin).await;
    let ours = open_store(&admin, "40.00", 5).await;
    let theirs = open_store(&admin, "55.00", 5).await;

    let shopper = client();
    register_customer(&shopper).await;
    for product in [&ours.product, &theirs.product] {
        let resp = shopper
            .post(format!("{}/api/cart", storefront_url()))
            .json(&json!({ "productId": product["id"], "quantity": 1 }))
            .send()
            .await
            .expect("Failed to add to cart");
        expect_json(resp, StatusCode::CREATED).await;
    }
    let resp = shopper
        .post(format!("{}/api/checkout", storefront_url()))
        .json(&json!({ "shippingAddress": shipping_address() }))
        .send()
        .await
        .expect("Failed to check out");
    let order = expect_json(resp, StatusCode::CREATED).await;
    assert_eq!(order["items"].as_array().map(Vec::len), Some(2));

    let merchant = client();
    login_staff(&merchant, &ours.merchant.email, TEST_PASSWORD).await;
    let resp = merchant
        .get(format!("{}/api/merchant/orders", admin_url()))
        .send()
        .await
        .expect("Failed to list orders");
    let page = expect_json(resp, StatusCode::OK).await;

    let mine = page["items"]
        .as_array()
        .and_then(|orders| orders.iter().find(|o| o["id"] == order["id"]))
        .expect("order visible to merchant");
    assert_eq!(mine["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(mine["items"][0]["productId"], ours.product["id"]);
}

#[tokio::test]
#[ignore = "Requires running servers, database and admin credentials"]
async fn test_merchant_revenue_is_net_of_discounts() {
    let admin = client();
    login_admin(&admin).await;
    let applicant = apply_as_merchant(&client()).await;
    approve(&admin, applicant.merchant_id).await;
    let mut body = product_body(applicant.merchant_id, "100.00", 5);
    body["discountPercent"] = json!(20);
    let product = create_product_from(&admin, &body).await;

    let shopper = client();
    register_customer(&shopper).await;
    let order = place_order(&shopper, product["id"].as_i64().expect("id"), 2).await;
    assert_money(&order["discount"], 40.0);

    let merchant = client();
    login_staff(&merchant, &applicant.email, TEST_PASSWORD).await;

    let resp = merchant
        .get(format!("{}/api/merchant/orders", admin_url()))
        .send()
        .await
        .expect("Failed to list orders");
    let page = expect_json(resp, StatusCode::OK).await;
    let mine = page["items"]
        .as_array()
        .and_then(|orders| orders.iter().find(|o| o["id"] == order["id"]))
        .expect("order visible to merchant");
    // 2 x 100.00 at 20% off
    assert_money(&mine["merchantTotal"], 160.0);
    assert_money(&mine["items"][0]["lineDiscount"], 40.0);

    let resp = merchant
        .get(format!("{}/api/merchant/dashboard/stats", admin_url()))
        .send()
        .await
        .expect("Failed to get stats");
    let stats = expect_json(resp, StatusCode::OK).await;
    assert_money(&stats["revenue"]["current"], 160.0);
    assert_money(&stats["unitsSold"]["current"], 2.0);
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server, database and admin credentials"]
async fn test_admin_cannot_demote_self() {
    let admin = client();
    let session = login_admin(&admin).await;
    let admin_id = session["id"].as_i64().expect("admin id");

    let resp = admin
        .put(format!("{}/api/admin/users/{admin_id}/role", admin_url()))
        .json(&json!({ "role": "CUSTOMER" }))
        .send()
        .await
        .expect("Failed to change role");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running servers, database and admin credentials"]
async fn test_collection_membership_keeps_order() {
    let admin = client();
    login_admin(&admin).await;
    let first = open_store(&admin, "10.00", 1).await;
    let second = open_store(&admin, "12.00", 1).await;

    let resp = admin
        .post(format!("{}/api/admin/collections", admin_url()))
        .json(&json!({ "name": unique_name("Winter Edit"), "season": "Winter" }))
        .send()
        .await
        .expect("Failed to create collection");
    let collection = expect_json(resp, StatusCode::CREATED).await;
    let id = collection["id"].as_i64().expect("collection id");

    let ids = [&second.product["id"], &first.product["id"]];
    let resp = admin
        .put(format!("{}/api/admin/collections/{id}/products", admin_url()))
        .json(&json!({ "productIds": ids }))
        .send()
        .await
        .expect("Failed to set products");
    let detail = expect_json(resp, StatusCode::OK).await;
    assert_eq!(detail["products"].as_array().map(Vec::len), Some(2));
    assert_eq!(&detail["products"][0]["id"], ids[0]);
    assert_eq!(&detail["products"][1]["id"], ids[1]);

    let resp = admin
        .delete(format!("{}/api/admin/collections/{id}", admin_url()))
        .send()
        .await
        .expect("Failed to delete collection");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
