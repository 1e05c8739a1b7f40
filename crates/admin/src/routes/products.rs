//! Product management for admins (every store) and merchants (own store).
//!
//! Merchant handlers pass their store id down to the repository, so a
//! product of another store is a plain 404.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use luxora_core::pagination::{Page, PageParams, Paginated};
use luxora_core::{MerchantId, ProductId, ProductStatus};

use crate::db::{ProductRepository, RepositoryError};
use crate::db::products::ProductFilter;
use crate::error::{AppError, Result};
use crate::extract::ValidatedJson;
use crate::middleware::{RequireAdmin, RequireMerchant};
use crate::models::{Product, ProductInput};
use crate::state::AppState;

/// Product list query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<ProductStatus>,
    /// Admin only; merchants always see their own store.
    pub merchant_id: Option<MerchantId>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListQuery {
    fn into_parts(self) -> (ProductFilter, Page) {
        let page = Page::from_params(PageParams {
            page: self.page,
            per_page: self.per_page,
        });
        let filter = ProductFilter {
            status: self.status,
            merchant_id: self.merchant_id,
            query: self.q,
        };
        (filter, page)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

async fn list(
    state: &AppState,
    owner: Option<MerchantId>,
    query: ListQuery,
) -> Result<Json<Paginated<Product>>> {
    let (filter, page) = query.into_parts();
    let products = ProductRepository::new(state.pool())
        .list(owner, &filter, page)
        .await?;
    Ok(Json(products))
}

async fn show(state: &AppState, id: ProductId, owner: Option<MerchantId>) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(id, owner)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

async fn update(
    state: &AppState,
    id: ProductId,
    owner: Option<MerchantId>,
    input: &ProductInput,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .update(id, owner, input)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => not_found(),
            other => other.into(),
        })?;

    tracing::info!(product_id = %id, status = %product.status, "product updated");
    Ok(Json(product))
}

async fn archive(state: &AppState, id: ProductId, owner: Option<MerchantId>) -> Result<StatusCode> {
    ProductRepository::new(state.pool())
        .archive(id, owner)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => not_found(),
            other => other.into(),
        })?;

    tracing::info!(product_id = %id, "product archived");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Admin
// =============================================================================

/// Products of every store.
///
/// GET /api/admin/products
pub async fn admin_index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<Product>>> {
    list(&state, None, query).await
}

/// Product detail.
///
/// GET /api/admin/products/{id}
pub async fn admin_show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    show(&state, id, None).await
}

/// Create a product for the store named in the body.
///
/// POST /api/admin/products
#[tracing::instrument(skip(state, _admin, input), fields(merchant_id))]
pub async fn admin_create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let merchant = input
        .merchant_id
        .ok_or_else(|| AppError::Validation("invalid fields: merchant_id".to_string()))?;
    tracing::Span::current().record("merchant_id", merchant.as_i32());

    let product = ProductRepository::new(state.pool())
        .create(merchant, &input)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound("Merchant not found".to_string())
            }
            other => other.into(),
        })?;

    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product's fields.
///
/// PUT /api/admin/products/{id}
pub async fn admin_update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
    ValidatedJson(input): ValidatedJson<ProductInput>,
) -> Result<Json<Product>> {
    update(&state, id, None, &input).await
}

/// Archive a product.
///
/// DELETE /api/admin/products/{id}
pub async fn admin_archive(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    archive(&state, id, None).await
}

// =============================================================================
// Merchant
// =============================================================================

/// Merchants cannot move products between stores or feature them.
fn merchant_input(mut input: ProductInput, merchant: MerchantId) -> ProductInput {
    input.merchant_id = Some(merchant);
    input.featured = None;
    input
}

/// The store's products.
///
/// GET /api/merchant/products
pub async fn merchant_index(
    State(state): State<AppState>,
    RequireMerchant(_staff, merchant): RequireMerchant,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<Product>>> {
    list(&state, Some(merchant), query).await
}

/// One of the store's products.
///
/// GET /api/merchant/products/{id}
pub async fn merchant_show(
    State(state): State<AppState>,
    RequireMerchant(_staff, merchant): RequireMerchant,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    show(&state, id, Some(merchant)).await
}

/// List a new product in the store.
///
/// POST /api/merchant/products
#[tracing::instrument(skip(state, _staff, input), fields(merchant_id = %merchant))]
pub async fn merchant_create(
    State(state): State<AppState>,
    RequireMerchant(_staff, merchant): RequireMerchant,
    ValidatedJson(input): ValidatedJson<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let input = merchant_input(input, merchant);
    let product = ProductRepository::new(state.pool())
        .create(merchant, &input)
        .await?;

    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace one of the store's products.
///
/// PUT /api/merchant/products/{id}
pub async fn merchant_update(
    State(state): State<AppState>,
    RequireMerchant(_staff, merchant): RequireMerchant,
    Path(id): Path<ProductId>,
    ValidatedJson(input): ValidatedJson<ProductInput>,
) -> Result<Json<Product>> {
    let input = merchant_input(input, merchant);
    update(&state, id, Some(merchant), &input).await
}

/// Archive one of the store's products.
///
/// DELETE /api/merchant/products/{id}
pub async fn merchant_archive(
    State(state): State<AppState>,
    RequireMerchant(_staff, merchant): RequireMerchant,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    archive(&state, id, Some(merchant)).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_merchant_input_is_pinned_to_store() {
        let input: ProductInput = serde_json::from_str(
            r#"{"merchantId":9,"name":"Silk Scarf","category":"Accessories","price":"45.00","stock":10,"featured":true}"#,
        )
        .unwrap();
        let input = merchant_input(input, MerchantId::new(2));
        assert_eq!(input.merchant_id, Some(MerchantId::new(2)));
        assert!(input.featured.is_none());
    }

    #[test]
    fn test_list_query_parts() {
        let query: ListQuery =
            serde_json::from_str(r#"{"status":"DRAFT","merchantId":3,"q":"silk"}"#).unwrap();
        let (filter, page) = query.into_parts();
        assert_eq!(filter.status, Some(ProductStatus::Draft));
        assert_eq!(filter.merchant_id, Some(MerchantId::new(3)));
        assert_eq!(filter.query.as_deref(), Some("silk"));
        assert_eq!(page.number, 1);
    }
}
