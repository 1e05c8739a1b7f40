//! Merchant storefront pages.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::db::{MerchantRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::models::MerchantStorefront;
use crate::state::AppState;

/// A merchant's public page with its products.
///
/// GET /api/merchants/{slug}
#[tracing::instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<MerchantStorefront>> {
    let merchant = MerchantRepository::new(state.pool())
        .get_active_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Merchant not found".to_string()))?;

    let products = ProductRepository::new(state.pool())
        .by_merchant(merchant.id)
        .await?;

    Ok(Json(MerchantStorefront { merchant, products }))
}
