//! Merchant store settings.

use axum::{Json, extract::State};

use crate::db::MerchantRepository;
use crate::error::{AppError, Result};
use crate::extract::ValidatedJson;
use crate::middleware::RequireMerchant;
use crate::models::{MerchantSettings, SettingsPatch};
use crate::state::AppState;

/// The signed-in merchant's store settings.
///
/// GET /api/merchant/settings
pub async fn show(
    State(state): State<AppState>,
    RequireMerchant(_staff, merchant): RequireMerchant,
) -> Result<Json<MerchantSettings>> {
    let settings = MerchantRepository::new(state.pool())
        .settings(merchant)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".to_string()))?;
    Ok(Json(settings))
}

/// Write only the supplied fields.
///
/// PUT /api/merchant/settings
#[tracing::instrument(skip(state, staff, patch), fields(user_id = %staff.id, merchant_id = %merchant))]
pub async fn update(
    State(state): State<AppState>,
    RequireMerchant(staff, merchant): RequireMerchant,
    ValidatedJson(patch): ValidatedJson<SettingsPatch>,
) -> Result<Json<MerchantSettings>> {
    let settings = MerchantRepository::new(state.pool())
        .update_settings(merchant, &patch)
        .await?;

    tracing::info!("store settings updated");
    Ok(Json(settings))
}
