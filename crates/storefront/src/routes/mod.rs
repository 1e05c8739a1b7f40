//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST   /api/auth/register                        - Create account (rate limited)
//! POST   /api/auth/login                           - Password login (rate limited)
//! POST   /api/auth/logout                          - End session
//! GET    /api/auth/me                              - Current user
//!
//! # Catalog
//! GET    /api/products                             - Listing, search, filters
//! GET    /api/products/featured                    - Featured shelf
//! GET    /api/products/{slug}                      - Product detail
//! GET    /api/products/{slug}/reviews              - Reviews
//! POST   /api/products/{slug}/reviews              - Upsert own review
//! GET    /api/collections                          - Active collections
//! GET    /api/collections/{slug}                   - Collection detail
//! GET    /api/merchants/{slug}                     - Merchant storefront
//!
//! # Cart, wishlist, checkout (requires auth)
//! GET    /api/cart                                 - Cart with totals
//! POST   /api/cart                                 - Add item
//! PUT    /api/cart                                 - Update quantity
//! DELETE /api/cart                                 - Clear
//! DELETE /api/cart/{itemId}                        - Remove line
//! GET    /api/wishlist                             - Wishlisted products
//! POST   /api/wishlist                             - Toggle
//! DELETE /api/wishlist/{productId}                 - Remove
//! POST   /api/checkout                             - Place order
//!
//! # Account (requires auth)
//! GET    /api/account/profile                      - Profile
//! PUT    /api/account/profile                      - Update profile
//! PUT    /api/account/password                     - Change password
//! GET    /api/account/orders                       - Order history
//! GET    /api/account/orders/{orderNumber}         - Order detail
//! GET    /api/account/payment-methods              - Saved cards
//! POST   /api/account/payment-methods              - Add card
//! PUT    /api/account/payment-methods/{id}/default - Make default
//! DELETE /api/account/payment-methods/{id}         - Remove card
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod collections;
pub mod merchants;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .merge(limited)
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/featured", get(products::featured))
        .route("/{slug}", get(products::show))
        .route(
            "/{slug}/reviews",
            get(products::reviews).post(products::submit_review),
        )
}

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(collections::index))
        .route("/{slug}", get(collections::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cart::show)
                .post(cart::add)
                .put(cart::update)
                .delete(cart::clear),
        )
        .route("/{item_id}", delete(cart::remove))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::index).post(wishlist::toggle))
        .route("/{product_id}", delete(wishlist::remove))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(account::profile).put(account::update_profile),
        )
        .route("/password", put(account::change_password))
        .route("/orders", get(account::orders))
        .route("/orders/{order_number}", get(account::order))
        .route(
            "/payment-methods",
            get(account::payment_methods).post(account::add_payment_method),
        )
        .route(
            "/payment-methods/{id}",
            delete(account::delete_payment_method),
        )
        .route(
            "/payment-methods/{id}/default",
            put(account::set_default_payment_method),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    let shopper = Router::new()
        .nest("/api/cart", cart_routes())
        .nest("/api/wishlist", wishlist_routes())
        .route("/api/checkout", post(checkout::create))
        .nest("/api/account", account_routes())
        .layer(api_rate_limiter());

    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/products", product_routes())
        .nest("/api/collections", collection_routes())
        .route("/api/merchants/{slug}", get(merchants::show))
        .merge(shopper)
}
