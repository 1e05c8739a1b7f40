//! Cart routes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use validator::Validate;

use luxora_core::{CartItemId, ProductId};

use crate::error::Result;
use crate::extract::ValidatedJson;
use crate::middleware::RequireAuth;
use crate::models::CartView;
use crate::services::CartService;
use crate::services::cart::Variant;
use crate::state::AppState;

/// Add-to-cart body: `{ productId, quantity, selectedColor, selectedSize }`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: i32,
    #[validate(length(max = 50))]
    pub selected_color: Option<String>,
    #[validate(length(max = 50))]
    pub selected_size: Option<String>,
}

const fn one() -> i32 {
    1
}

/// Quantity update body: `{ itemId, quantity }`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub item_id: CartItemId,
    pub quantity: i32,
}

/// The cart with totals.
///
/// GET /api/cart
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool()).view(user.id).await?;
    Ok(Json(cart))
}

/// Add a product to the cart and return the updated cart.
///
/// POST /api/cart
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ValidatedJson(form): ValidatedJson<AddItemRequest>,
) -> Result<(StatusCode, Json<CartView>)> {
    let service = CartService::new(state.pool());
    let variant = Variant::new(form.selected_color.as_deref(), form.selected_size.as_deref());
    service
        .add(user.id, form.product_id, form.quantity, variant)
        .await?;

    Ok((StatusCode::CREATED, Json(service.view(user.id).await?)))
}

/// Change a line's quantity and return the updated cart.
///
/// PUT /api/cart
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ValidatedJson(form): ValidatedJson<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let service = CartService::new(state.pool());
    service.update(user.id, form.item_id, form.quantity).await?;
    Ok(Json(service.view(user.id).await?))
}

/// Remove a line and return the updated cart.
///
/// DELETE /api/cart/{itemId}
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(item): Path<CartItemId>,
) -> Result<Json<CartView>> {
    let service = CartService::new(state.pool());
    service.remove(user.id, item).await?;
    Ok(Json(service.view(user.id).await?))
}

/// Empty the cart.
///
/// DELETE /api/cart
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<StatusCode> {
    CartService::new(state.pool()).clear(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_request_shape() {
        let body: AddItemRequest =
            serde_json::from_str(r#"{"productId": 7, "selectedColor": "Noir"}"#).unwrap();
        assert_eq!(body.product_id, ProductId::new(7));
        assert_eq!(body.quantity, 1);
        assert_eq!(body.selected_color.as_deref(), Some("Noir"));
        assert!(body.selected_size.is_none());
    }
}
