//! Dashboard routes for admins (platform-wide) and merchants (own store).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::Deserialize;

use luxora_core::activity::{ActivityItem, effective_limit};
use luxora_core::stats::{MonthlyPoint, REVENUE_SERIES_MONTHS};

use crate::db::{DashboardRepository, Scope};
use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireMerchant};
use crate::models::{MerchantStats, PlatformStats, TopProduct};
use crate::state::AppState;

/// Best sellers shown on the admin dashboard.
const TOP_PRODUCTS_LIMIT: i64 = 5;

/// `?limit=` for the activity feed.
#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
}

async fn revenue(state: &AppState, scope: Scope) -> Result<Json<Vec<MonthlyPoint>>> {
    let series = DashboardRepository::new(state.pool())
        .revenue_series(scope, Utc::now(), REVENUE_SERIES_MONTHS)
        .await?;
    Ok(Json(series))
}

async fn activity(
    state: &AppState,
    scope: Scope,
    query: &ActivityQuery,
) -> Result<Json<Vec<ActivityItem>>> {
    let feed = DashboardRepository::new(state.pool())
        .activity(scope, Utc::now(), effective_limit(query.limit))
        .await?;
    Ok(Json(feed))
}

// =============================================================================
// Admin
// =============================================================================

/// Platform stat cards, cached for a minute.
///
/// GET /api/admin/dashboard/stats
pub async fn admin_stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Arc<PlatformStats>>> {
    Ok(Json(state.stats().platform(state.pool()).await?))
}

/// Platform revenue for the last twelve months.
///
/// GET /api/admin/dashboard/revenue
pub async fn admin_revenue(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<MonthlyPoint>>> {
    revenue(&state, Scope::Platform).await
}

/// Recent orders, listings and reviews across the platform.
///
/// GET /api/admin/dashboard/activity
pub async fn admin_activity(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityItem>>> {
    activity(&state, Scope::Platform, &query).await
}

/// Best sellers this month.
///
/// GET /api/admin/dashboard/top-products
pub async fn admin_top_products(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<TopProduct>>> {
    let products = DashboardRepository::new(state.pool())
        .top_products(Scope::Platform, Utc::now(), TOP_PRODUCTS_LIMIT)
        .await?;
    Ok(Json(products))
}

// =============================================================================
// Merchant
// =============================================================================

/// The store's stat cards, cached for a minute.
///
/// GET /api/merchant/dashboard/stats
pub async fn merchant_stats(
    State(state): State<AppState>,
    RequireMerchant(_staff, merchant): RequireMerchant,
) -> Result<Json<Arc<MerchantStats>>> {
    Ok(Json(state.stats().merchant(state.pool(), merchant).await?))
}

/// The store's revenue for the last twelve months.
///
/// GET /api/merchant/dashboard/revenue
pub async fn merchant_revenue(
    State(state): State<AppState>,
    RequireMerchant(_staff, merchant): RequireMerchant,
) -> Result<Json<Vec<MonthlyPoint>>> {
    revenue(&state, Scope::Merchant(merchant)).await
}

/// Recent orders, listings and reviews for the store.
///
/// GET /api/merchant/dashboard/activity
pub async fn merchant_activity(
    State(state): State<AppState>,
    RequireMerchant(_staff, merchant): RequireMerchant,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityItem>>> {
    activity(&state, Scope::Merchant(merchant), &query).await
}

/// The store's best sellers this month.
///
/// GET /api/merchant/dashboard/top-products
pub async fn merchant_top_products(
    State(state): State<AppState>,
    RequireMerchant(_staff, merchant): RequireMerchant,
) -> Result<Json<Vec<TopProduct>>> {
    let products = DashboardRepository::new(state.pool())
        .top_products(Scope::Merchant(merchant), Utc::now(), TOP_PRODUCTS_LIMIT)
        .await?;
    Ok(Json(products))
}
