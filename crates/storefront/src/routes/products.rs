//! Catalog routes: listing, search, product pages and reviews.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use luxora_core::pagination::{Page, PageParams, Paginated};

use crate::db::products::{ProductFilter, ProductSort};
use crate::db::{ProductRepository, ReviewRepository};
use crate::error::{AppError, Result};
use crate::extract::ValidatedJson;
use crate::middleware::RequireAuth;
use crate::models::{ProductCard, ProductDetail, Review};
use crate::state::AppState;

/// `GET /api/products` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    /// Merchant slug.
    pub merchant: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub sort: ProductSort,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ListQuery {
    fn into_parts(self) -> (ProductFilter, Page) {
        let page = Page::from_params(PageParams {
            page: self.page,
            per_page: self.per_page,
        });
        let filter = ProductFilter {
            query: non_blank(self.q),
            category: non_blank(self.category),
            merchant: non_blank(self.merchant),
            min_price: self.min_price.filter(|p| !p.is_sign_negative()),
            max_price: self.max_price.filter(|p| !p.is_sign_negative()),
            sort: self.sort,
        };
        (filter, page)
    }
}

/// Product listing with search, filters and sorting.
///
/// GET /api/products
#[tracing::instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<ProductCard>>> {
    let (filter, page) = query.into_parts();
    let products = ProductRepository::new(state.pool()).list(&filter, page).await?;
    Ok(Json(products))
}

/// Featured products shelf.
///
/// GET /api/products/featured
pub async fn featured(State(state): State<AppState>) -> Result<Json<Vec<ProductCard>>> {
    let products = ProductRepository::new(state.pool()).featured().await?;
    Ok(Json(products))
}

/// Product page.
///
/// GET /api/products/{slug}
#[tracing::instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>> {
    ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// Reviews of a product, newest first.
///
/// GET /api/products/{slug}/reviews
pub async fn reviews(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<Review>>> {
    let product = ProductRepository::new(state.pool())
        .visible_id_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let reviews = ReviewRepository::new(state.pool()).for_product(product).await?;
    Ok(Json(reviews))
}

/// Review form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(min = 1, max = 2000))]
    pub comment: String,
}

/// Create or replace the signed-in user's review.
///
/// POST /api/products/{slug}/reviews
#[tracing::instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn submit_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(slug): Path<String>,
    ValidatedJson(form): ValidatedJson<ReviewRequest>,
) -> Result<Json<Review>> {
    let product = ProductRepository::new(state.pool())
        .visible_id_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let review = ReviewRepository::new(state.pool())
        .upsert(user.id, product, form.rating, form.comment.trim())
        .await?;

    tracing::info!(product_id = %product, rating = form.rating, "review saved");
    Ok(Json(review))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_normalizes() {
        let query = ListQuery {
            q: Some("  ".to_string()),
            category: Some(" Bags ".to_string()),
            min_price: Some(Decimal::new(-5, 0)),
            max_price: Some(Decimal::new(300, 0)),
            per_page: Some(500),
            ..ListQuery::default()
        };
        let (filter, page) = query.into_parts();

        assert!(filter.query.is_none());
        assert_eq!(filter.category.as_deref(), Some("Bags"));
        assert!(filter.min_price.is_none());
        assert_eq!(filter.max_price, Some(Decimal::new(300, 0)));
        assert_eq!(page.number, 1);
        assert_eq!(page.per_page, 60);
    }

    #[test]
    fn test_review_rating_range() {
        let review = ReviewRequest {
            rating: 6,
            comment: "Lovely".to_string(),
        };
        assert!(review.validate().is_err());

        let review = ReviewRequest {
            rating: 5,
            comment: "Lovely".to_string(),
        };
        assert!(review.validate().is_ok());
    }
}
