//! HTTP route handlers for the admin and merchant dashboards.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST   /api/auth/login                      - Staff login (rate limited)
//! POST   /api/auth/logout                     - End session
//! GET    /api/auth/me                         - Current staff member
//! POST   /api/merchant/register               - Merchant application (rate limited)
//!
//! # Admin (requires ADMIN)
//! GET    /api/admin/dashboard/stats           - Platform stats (cached)
//! GET    /api/admin/dashboard/revenue         - 12-month revenue series
//! GET    /api/admin/dashboard/activity        - Activity feed
//! GET    /api/admin/dashboard/top-products    - Best sellers this month
//! GET    /api/admin/merchants                 - Stores
//! POST   /api/admin/merchants                 - Open a store for an existing user
//! GET    /api/admin/merchants/{id}            - Store detail with live stats
//! PUT    /api/admin/merchants/{id}            - Update profile
//! DELETE /api/admin/merchants/{id}            - Suspend
//! POST   /api/admin/merchants/{id}/status     - Lifecycle transition
//! GET    /api/admin/products                  - All products
//! POST   /api/admin/products                  - Create for a store
//! GET    /api/admin/products/{id}             - Product detail
//! PUT    /api/admin/products/{id}             - Update
//! DELETE /api/admin/products/{id}             - Archive
//! GET    /api/admin/collections               - Collections
//! POST   /api/admin/collections               - Create
//! GET    /api/admin/collections/{id}          - Detail with products
//! PUT    /api/admin/collections/{id}          - Update
//! DELETE /api/admin/collections/{id}          - Delete
//! PUT    /api/admin/collections/{id}/products - Replace membership
//! GET    /api/admin/orders                    - Orders
//! GET    /api/admin/orders/{id}               - Order detail
//! PUT    /api/admin/orders/{id}/status        - Status transition
//! GET    /api/admin/users                     - Users
//! PUT    /api/admin/users/{id}/role           - Change role
//!
//! # Merchant (requires MERCHANT with a PENDING or ACTIVE store)
//! GET    /api/merchant/dashboard/stats        - Store stats (cached)
//! GET    /api/merchant/dashboard/revenue      - 12-month revenue series
//! GET    /api/merchant/dashboard/activity     - Store activity feed
//! GET    /api/merchant/dashboard/top-products - Store best sellers
//! GET    /api/merchant/settings               - Store settings
//! PUT    /api/merchant/settings               - Partial update
//! GET    /api/merchant/products               - Own products
//! POST   /api/merchant/products               - Create
//! GET    /api/merchant/products/{id}          - Own product detail
//! PUT    /api/merchant/products/{id}          - Update
//! DELETE /api/merchant/products/{id}          - Archive
//! GET    /api/merchant/orders                 - Orders with own items
//! ```

pub mod auth;
pub mod collections;
pub mod dashboard;
pub mod merchants;
pub mod orders;
pub mod products;
pub mod settings;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .merge(limited)
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(dashboard::admin_stats))
        .route("/dashboard/revenue", get(dashboard::admin_revenue))
        .route("/dashboard/activity", get(dashboard::admin_activity))
        .route("/dashboard/top-products", get(dashboard::admin_top_products))
        .route("/merchants", get(merchants::index).post(merchants::create))
        .route(
            "/merchants/{id}",
            get(merchants::show)
                .put(merchants::update)
                .delete(merchants::suspend),
        )
        .route("/merchants/{id}/status", post(merchants::set_status))
        .route(
            "/products",
            get(products::admin_index).post(products::admin_create),
        )
        .route(
            "/products/{id}",
            get(products::admin_show)
                .put(products::admin_update)
                .delete(products::admin_archive),
        )
        .route(
            "/collections",
            get(collections::index).post(collections::create),
        )
        .route(
            "/collections/{id}",
            get(collections::show)
                .put(collections::update)
                .delete(collections::destroy),
        )
        .route("/collections/{id}/products", put(collections::set_products))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", put(orders::set_status))
        .route("/users", get(users::index))
        .route("/users/{id}/role", put(users::set_role))
}

/// Create the merchant routes router.
pub fn merchant_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/register", post(auth::register_merchant))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/dashboard/stats", get(dashboard::merchant_stats))
        .route("/dashboard/revenue", get(dashboard::merchant_revenue))
        .route("/dashboard/activity", get(dashboard::merchant_activity))
        .route(
            "/dashboard/top-products",
            get(dashboard::merchant_top_products),
        )
        .route("/settings", get(settings::show).put(settings::update))
        .route(
            "/products",
            get(products::merchant_index).post(products::merchant_create),
        )
        .route(
            "/products/{id}",
            get(products::merchant_show)
                .put(products::merchant_update)
                .delete(products::merchant_archive),
        )
        .route("/orders", get(orders::merchant_index))
        .merge(limited)
}

/// Create all routes for the dashboards.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/admin", admin_routes())
        .nest("/api/merchant", merchant_routes())
}
