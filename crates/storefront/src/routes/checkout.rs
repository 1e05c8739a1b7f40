//! Checkout route.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use validator::Validate;

use luxora_core::PaymentMethodId;

use crate::db::OrderRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::ValidatedJson;
use crate::middleware::RequireAuth;
use crate::models::{Address, OrderDetail};
use crate::services::CheckoutService;
use crate::state::AppState;

/// Checkout body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate(nested)]
    pub shipping_address: Address,
    /// Saved card to charge; defaults to the user's default card.
    pub payment_method_id: Option<PaymentMethodId>,
}

/// Place an order for the cart.
///
/// POST /api/checkout
#[tracing::instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ValidatedJson(form): ValidatedJson<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderDetail>)> {
    let placed = CheckoutService::new(state.pool())
        .place_order(user.id, &form.shipping_address, form.payment_method_id)
        .await?;
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_number", placed.order_number.as_str())]),
    );
    if placed.skipped_lines > 0 {
        tracing::info!(
            order_number = %placed.order_number,
            skipped = placed.skipped_lines,
            "unavailable lines left in cart"
        );
    }

    let order = OrderRepository::new(state.pool())
        .get_for_user(user.id, &placed.order_number)
        .await?
        .ok_or_else(|| AppError::Internal("placed order not readable".to_string()))?;

    Ok((StatusCode::CREATED, Json(order)))
}
