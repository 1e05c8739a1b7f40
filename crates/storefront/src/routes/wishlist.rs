//! Wishlist routes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use luxora_core::ProductId;

use crate::db::{ProductRepository, WishlistRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::ProductCard;
use crate::state::AppState;

/// Toggle body: `{ productId }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub product_id: ProductId,
}

/// Toggle result.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub wishlisted: bool,
}

/// Wishlisted products, most recently added first.
///
/// GET /api/wishlist
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<ProductCard>>> {
    let products = ProductRepository::new(state.pool()).wishlisted(user.id).await?;
    Ok(Json(products))
}

/// Add the product if absent, remove it if present.
///
/// POST /api/wishlist
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(form): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>> {
    ProductRepository::new(state.pool())
        .purchasable(form.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let wishlisted = WishlistRepository::new(state.pool())
        .toggle(user.id, form.product_id)
        .await?;
    Ok(Json(ToggleResponse { wishlisted }))
}

/// Remove a product from the wishlist.
///
/// DELETE /api/wishlist/{productId}
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product): Path<ProductId>,
) -> Result<StatusCode> {
    WishlistRepository::new(state.pool())
        .remove(user.id, product)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
