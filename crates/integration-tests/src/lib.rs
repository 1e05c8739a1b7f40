//! Integration tests for Luxora.
//!
//! # Running Tests
//!
//! The tests talk to running servers over HTTP and are ignored by default:
//!
//! ```bash
//! luxora-cli migrate
//! luxora-cli admin create -e "$LUXORA_ADMIN_EMAIL" -n Admin -p "$LUXORA_ADMIN_PASSWORD"
//! cargo run -p luxora-storefront &
//! cargo run -p luxora-admin &
//! cargo test -p luxora-integration-tests -- --ignored --test-threads=1
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - defaults to `http://localhost:3000`
//! - `ADMIN_BASE_URL` - defaults to `http://localhost:3001`
//! - `LUXORA_ADMIN_EMAIL`, `LUXORA_ADMIN_PASSWORD` - an existing admin account

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Password used for every account the tests create.
pub const TEST_PASSWORD: &str = "integration-pass-123";

/// Base URL for the storefront API.
#[must_use]
pub fn storefront_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the dashboard API.
#[must_use]
pub fn admin_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A client that keeps session cookies between requests.
///
/// Each client presents its own `X-Real-IP` so the sign-in rate limiters
/// treat test clients as separate visitors.
#[must_use]
pub fn client() -> Client {
    let [a, b, ..] = *Uuid::new_v4().as_bytes();
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-real-ip",
        HeaderValue::from_str(&format!("198.18.{a}.{b}")).expect("valid header"),
    );

    Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// An email address no other test run has used.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@luxora.test", Uuid::new_v4().simple())
}

/// A name no other test run has used.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    format!("{prefix} {suffix}")
}

/// Parse a JSON body, asserting the status first.
pub async fn expect_json(resp: reqwest::Response, status: StatusCode) -> Value {
    let actual = resp.status();
    let body = resp.text().await.expect("Failed to read response");
    assert_eq!(actual, status, "unexpected status, body: {body}");
    serde_json::from_str(&body).expect("Response is not JSON")
}

/// Register a storefront customer; the client is signed in afterwards.
pub async fn register_customer(client: &Client) -> Value {
    let resp = client
        .post(format!("{}/api/auth/register", storefront_url()))
        .json(&json!({
            "email": unique_email("shopper"),
            "name": "Test Shopper",
            "password": TEST_PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to register");
    expect_json(resp, StatusCode::CREATED).await
}

/// Sign in to the dashboards with the admin account from the environment.
pub async fn login_admin(client: &Client) -> Value {
    let email = std::env::var("LUXORA_ADMIN_EMAIL").expect("LUXORA_ADMIN_EMAIL not set");
    let password = std::env::var("LUXORA_ADMIN_PASSWORD").expect("LUXORA_ADMIN_PASSWORD not set");
    login_staff(client, &email, &password).await
}

/// Sign in to the dashboards.
pub async fn login_staff(client: &Client, email: &str, password: &str) -> Value {
    let resp = client
        .post(format!("{}/api/auth/login", admin_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to log in");
    expect_json(resp, StatusCode::OK).await
}

/// A merchant applicant and their store.
#[derive(Debug, Clone)]
pub struct Applicant {
    pub email: String,
    pub merchant_id: i64,
}

/// Submit a public merchant application.
pub async fn apply_as_merchant(client: &Client) -> Applicant {
    let email = unique_email("merchant");
    let resp = client
        .post(format!("{}/api/merchant/register", admin_url()))
        .json(&json!({
            "email": email,
            "name": "Test Merchant",
            "password": TEST_PASSWORD,
            "storeName": unique_name("Atelier"),
            "storeDescription": "Handmade leather goods",
            "storeEmail": email,
        }))
        .send()
        .await
        .expect("Failed to apply");
    let body = expect_json(resp, StatusCode::CREATED).await;
    assert_eq!(body["status"], "PENDING");

    Applicant {
        email,
        merchant_id: body["merchantId"].as_i64().expect("merchantId"),
    }
}

/// Body of an active one-color scarf, for product create and update calls.
#[must_use]
pub fn product_body(merchant_id: i64, price: &str, stock: i32) -> Value {
    json!({
        "merchantId": merchant_id,
        "name": unique_name("Silk Scarf"),
        "description": "Hand-rolled edges",
        "category": "Accessories",
        "price": price,
        "stock": stock,
        "colors": ["Ivory"],
        "sizes": ["One size"],
        "status": "ACTIVE",
    })
}

/// Create a product from a full body through the admin API.
pub async fn create_product_from(admin: &Client, body: &Value) -> Value {
    let resp = admin
        .post(format!("{}/api/admin/products", admin_url()))
        .json(body)
        .send()
        .await
        .expect("Failed to create product");
    expect_json(resp, StatusCode::CREATED).await
}

/// Create an active product through the admin API; returns the product.
pub async fn create_product(admin: &Client, merchant_id: i64, price: &str, stock: i32) -> Value {
    create_product_from(admin, &product_body(merchant_id, price, stock)).await
}

/// Approve a pending store.
pub async fn approve(admin: &Client, merchant_id: i64) {
    let resp = admin
        .post(format!(
            "{}/api/admin/merchants/{merchant_id}/status",
            admin_url()
        ))
        .json(&json!({ "status": "ACTIVE" }))
        .send()
        .await
        .expect("Failed to approve");
    let body = expect_json(resp, StatusCode::OK).await;
    assert_eq!(body["status"], "ACTIVE");
}

/// A shipping address that passes validation.
#[must_use]
pub fn shipping_address() -> Value {
    json!({
        "fullName": "Test Shopper",
        "line1": "1 Rue de la Paix",
        "city": "Paris",
        "postalCode": "75002",
        "country": "FR",
    })
}

/// A money field as a float, for comparisons in tests.
#[must_use]
pub fn money(value: &Value) -> f64 {
    match value {
        Value::String(s) => s.parse().expect("money string"),
        other => other.as_f64().expect("money number"),
    }
}

/// An active store with one active product, ready to sell.
#[derive(Debug, Clone)]
pub struct Listing {
    pub merchant: Applicant,
    pub product: Value,
}

/// Apply, approve and stock a store through the admin API.
pub async fn open_store(admin: &Client, price: &str, stock: i32) -> Listing {
    let merchant = apply_as_merchant(&client()).await;
    approve(admin, merchant.merchant_id).await;
    let product = create_product(admin, merchant.merchant_id, price, stock).await;
    Listing { merchant, product }
}

/// Add units of a product, optionally in a color, to the signed-in
/// customer's cart. Returns the raw response.
pub async fn add_to_cart(
    shopper: &Client,
    product_id: i64,
    quantity: i32,
    color: Option<&str>,
) -> reqwest::Response {
    shopper
        .post(format!("{}/api/cart", storefront_url()))
        .json(&json!({
            "productId": product_id,
            "quantity": quantity,
            "selectedColor": color,
        }))
        .send()
        .await
        .expect("Failed to add to cart")
}

/// Check out the signed-in customer's cart. Returns the raw response.
pub async fn checkout(shopper: &Client) -> reqwest::Response {
    shopper
        .post(format!("{}/api/checkout", storefront_url()))
        .json(&json!({ "shippingAddress": shipping_address() }))
        .send()
        .await
        .expect("Failed to check out")
}

/// Add a product to the signed-in customer's cart and check out.
pub async fn place_order(shopper: &Client, product_id: i64, quantity: i32) -> Value {
    let resp = add_to_cart(shopper, product_id, quantity, None).await;
    expect_json(resp, StatusCode::CREATED).await;
    expect_json(checkout(shopper).await, StatusCode::CREATED).await
}

/// Assert a money field equals `expected`, within a tenth of a cent.
pub fn assert_money(value: &Value, expected: f64) {
    let actual = money(value);
    assert!(
        (actual - expected).abs() < 0.001,
        "expected {expected}, got {value}"
    );
}
