//! Collection routes (served from the catalog cache).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{CollectionDetail, CollectionSummary};
use crate::state::AppState;

/// `GET /api/collections` query string.
#[derive(Debug, Default, Deserialize)]
pub struct CollectionQuery {
    pub season: Option<String>,
}

/// Active collections.
///
/// GET /api/collections
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CollectionQuery>,
) -> Result<Json<Arc<Vec<CollectionSummary>>>> {
    let collections = state
        .catalog()
        .collections(state.pool(), query.season.as_deref())
        .await?;
    Ok(Json(collections))
}

/// Collection page.
///
/// GET /api/collections/{slug}
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Arc<CollectionDetail>>> {
    state
        .catalog()
        .collection(state.pool(), &slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Collection not found".to_string()))
}
