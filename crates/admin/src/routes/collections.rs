//! Admin collection management: curated, ordered product groups shown on
//! the storefront.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use luxora_core::CollectionId;

use crate::db::CollectionRepository;
use crate::error::{AppError, Result};
use crate::extract::ValidatedJson;
use crate::middleware::RequireAdmin;
use crate::models::{Collection, CollectionDetail, CollectionInput, CollectionProductsInput};
use crate::state::AppState;

async fn detail(state: &AppState, id: CollectionId) -> Result<CollectionDetail> {
    CollectionRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Collection not found".to_string()))
}

/// Every collection, active or not.
///
/// GET /api/admin/collections
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Collection>>> {
    Ok(Json(CollectionRepository::new(state.pool()).list().await?))
}

/// A collection with its products in display order.
///
/// GET /api/admin/collections/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<CollectionId>,
) -> Result<Json<CollectionDetail>> {
    Ok(Json(detail(&state, id).await?))
}

/// Create an empty collection.
///
/// POST /api/admin/collections
#[tracing::instrument(skip(state, _admin, input), fields(name = %input.name))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CollectionInput>,
) -> Result<(StatusCode, Json<CollectionDetail>)> {
    let id = CollectionRepository::new(state.pool()).create(&input).await?;

    tracing::info!(collection_id = %id, "collection created");
    Ok((StatusCode::CREATED, Json(detail(&state, id).await?)))
}

/// Replace a collection's fields.
///
/// PUT /api/admin/collections/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<CollectionId>,
    ValidatedJson(input): ValidatedJson<CollectionInput>,
) -> Result<Json<CollectionDetail>> {
    CollectionRepository::new(state.pool()).update(id, &input).await?;
    Ok(Json(detail(&state, id).await?))
}

/// Delete a collection. Its products are untouched.
///
/// DELETE /api/admin/collections/{id}
#[tracing::instrument(skip(state, _admin))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<CollectionId>,
) -> Result<StatusCode> {
    CollectionRepository::new(state.pool()).delete(id).await?;

    tracing::info!(collection_id = %id, "collection deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the membership; list order becomes display order.
///
/// PUT /api/admin/collections/{id}/products
#[tracing::instrument(skip(state, _admin, input), fields(count = input.product_ids.len()))]
pub async fn set_products(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<CollectionId>,
    ValidatedJson(input): ValidatedJson<CollectionProductsInput>,
) -> Result<Json<CollectionDetail>> {
    CollectionRepository::new(state.pool())
        .replace_products(id, &input.product_ids)
        .await?;
    Ok(Json(detail(&state, id).await?))
}
