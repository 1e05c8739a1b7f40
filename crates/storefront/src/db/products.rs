//! Product repository: catalog listing, search and product pages.
//!
//! Only `ACTIVE` products of `ACTIVE` merchants are ever returned.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use luxora_core::pagination::{Page, Paginated};
use luxora_core::pricing::sale_price;
use luxora_core::{CollectionId, MerchantId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{ProductCard, ProductDetail, RatingSummary};

/// Number of products on the featured shelf.
pub const FEATURED_LIMIT: i64 = 8;

/// Listing sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Rating,
}

impl ProductSort {
    const fn order_by(self) -> &'static str {
        match self {
            Self::Newest => " ORDER BY p.created_at DESC, p.id DESC",
            Self::PriceAsc => " ORDER BY p.price ASC, p.id ASC",
            Self::PriceDesc => " ORDER BY p.price DESC, p.id DESC",
            Self::Rating => {
                " ORDER BY r.average DESC NULLS LAST, r.review_count DESC, p.id DESC"
            }
        }
    }
}

/// Catalog filters.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Free-text search over name, description and category.
    pub query: Option<String>,
    pub category: Option<String>,
    /// Merchant slug.
    pub merchant: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: ProductSort,
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    merchant_id: MerchantId,
    name: String,
    slug: String,
    description: String,
    category: String,
    price: Decimal,
    discount_percent: i32,
    stock: i32,
    images: Vec<String>,
    sizes: Vec<String>,
    colors: Vec<String>,
    featured: bool,
    created_at: DateTime<Utc>,
    merchant_name: String,
    merchant_slug: String,
    average_rating: Option<Decimal>,
    review_count: i64,
}

impl ProductRow {
    const fn rating(&self) -> RatingSummary {
        RatingSummary {
            average: self.average_rating,
            count: self.review_count,
        }
    }
}

impl From<ProductRow> for ProductCard {
    fn from(row: ProductRow) -> Self {
        let rating = row.rating();
        Self {
            id: row.id,
            sale_price: sale_price(row.price, row.discount_percent),
            image: row.images.into_iter().next(),
            in_stock: row.stock > 0,
            name: row.name,
            slug: row.slug,
            category: row.category,
            price: row.price,
            discount_percent: row.discount_percent,
            featured: row.featured,
            merchant_name: row.merchant_name,
            merchant_slug: row.merchant_slug,
            rating,
        }
    }
}

impl From<ProductRow> for ProductDetail {
    fn from(row: ProductRow) -> Self {
        let rating = row.rating();
        Self {
            id: row.id,
            sale_price: sale_price(row.price, row.discount_percent),
            in_stock: row.stock > 0,
            name: row.name,
            slug: row.slug,
            description: row.description,
            category: row.category,
            price: row.price,
            discount_percent: row.discount_percent,
            stock: row.stock,
            images: row.images,
            sizes: row.sizes,
            colors: row.colors,
            featured: row.featured,
            merchant_id: row.merchant_id,
            merchant_name: row.merchant_name,
            merchant_slug: row.merchant_slug,
            rating,
            created_at: row.created_at,
        }
    }
}

/// Stock and variant options of a purchasable product.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PurchasableProduct {
    pub id: ProductId,
    pub name: String,
    pub stock: i32,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
}

const PRODUCT_SELECT: &str = r"
    SELECT p.id, p.merchant_id, p.name, p.slug, p.description, p.category,
           p.price, p.discount_percent, p.stock, p.images, p.sizes, p.colors,
           p.featured, p.created_at,
           m.name AS merchant_name, m.slug AS merchant_slug,
           r.average AS average_rating, r.review_count
    FROM luxora.products p
    JOIN luxora.merchants m ON m.id = p.merchant_id
    LEFT JOIN LATERAL (
        SELECT ROUND(AVG(rating)::numeric, 1) AS average, COUNT(*) AS review_count
        FROM luxora.reviews
        WHERE product_id = p.id
    ) r ON TRUE
";

const VISIBLE: &str = " WHERE p.status = 'ACTIVE' AND m.status = 'ACTIVE'";

/// Append the catalog filters after the visibility clause.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    if let Some(q) = filter.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{}%", escape_like(q));
        qb.push(" AND (p.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.category ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
        qb.push(" AND LOWER(p.category) = LOWER(")
            .push_bind(category.to_owned())
            .push(")");
    }
    if let Some(merchant) = filter.merchant.as_deref().filter(|m| !m.is_empty()) {
        qb.push(" AND m.slug = ").push_bind(merchant.to_owned());
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND p.price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND p.price <= ").push_bind(max);
    }
}

/// Escape `%`, `_` and `\` for use inside an `ILIKE` pattern.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog queries.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List visible products matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<Paginated<ProductCard>, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM luxora.products p JOIN luxora.merchants m ON m.id = p.merchant_id",
        );
        count.push(VISIBLE);
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        qb.push(VISIBLE);
        push_filters(&mut qb, filter);
        qb.push(filter.sort.order_by());
        qb.push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<ProductRow> = qb.build_query_as().fetch_all(self.pool).await?;
        let items = rows.into_iter().map(ProductCard::from).collect();

        Ok(Paginated::new(items, page, total))
    }

    /// Featured products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured(&self) -> Result<Vec<ProductCard>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{PRODUCT_SELECT}{VISIBLE} AND p.featured ORDER BY p.created_at DESC, p.id DESC LIMIT $1"
        ))
        .bind(FEATURED_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductCard::from).collect())
    }

    /// Product page by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<ProductDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "{PRODUCT_SELECT}{VISIBLE} AND p.slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ProductDetail::from))
    }

    /// ID of a visible product by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn visible_id_by_slug(&self, slug: &str) -> Result<Option<ProductId>, RepositoryError> {
        let id = sqlx::query_scalar::<_, ProductId>(&format!(
            "SELECT p.id FROM luxora.products p JOIN luxora.merchants m ON m.id = p.merchant_id{VISIBLE} AND p.slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(id)
    }

    /// Stock and options of a visible product, for adding to the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn purchasable(
        &self,
        id: ProductId,
    ) -> Result<Option<PurchasableProduct>, RepositoryError> {
        let product = sqlx::query_as::<_, PurchasableProduct>(&format!(
            "SELECT p.id, p.name, p.stock, p.sizes, p.colors FROM luxora.products p JOIN luxora.merchants m ON m.id = p.merchant_id{VISIBLE} AND p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Visible products of one merchant, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_merchant(&self, merchant: MerchantId) -> Result<Vec<ProductCard>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{PRODUCT_SELECT}{VISIBLE} AND p.merchant_id = $1 ORDER BY p.created_at DESC, p.id DESC"
        ))
        .bind(merchant)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductCard::from).collect())
    }

    /// Visible products on a user's wishlist, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn wishlisted(&self, user: UserId) -> Result<Vec<ProductCard>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"{PRODUCT_SELECT}
            JOIN luxora.wishlist_items w ON w.product_id = p.id
            {VISIBLE} AND w.user_id = $1
            ORDER BY w.created_at DESC, w.id DESC"
        ))
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductCard::from).collect())
    }

    /// Visible products of a collection in curated order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_collection(
        &self,
        collection: CollectionId,
    ) -> Result<Vec<ProductCard>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"{PRODUCT_SELECT}
            JOIN luxora.collection_products cp ON cp.product_id = p.id
            {VISIBLE} AND cp.collection_id = $1
            ORDER BY cp.position ASC, p.id ASC"
        ))
        .bind(collection)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductCard::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("silk"), "silk");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn test_filters_are_bound() {
        let filter = ProductFilter {
            query: Some("  scarf ".to_string()),
            category: Some("Accessories".to_string()),
            merchant: Some("maison-lune".to_string()),
            min_price: Some(Decimal::new(50, 0)),
            max_price: None,
            sort: ProductSort::PriceAsc,
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM luxora.products p");
        push_filters(&mut qb, &filter);
        let sql = qb.sql();

        assert!(sql.contains("p.name ILIKE $1"));
        assert!(sql.contains("LOWER(p.category) = LOWER($4)"));
        assert!(sql.contains("m.slug = $5"));
        assert!(sql.contains("p.price >= $6"));
        assert!(!sql.contains("p.price <="));
    }

    #[test]
    fn test_blank_query_is_ignored() {
        let filter = ProductFilter {
            query: Some("   ".to_string()),
            ..ProductFilter::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1");
        push_filters(&mut qb, &filter);
        assert_eq!(qb.sql(), "SELECT 1");
    }

    #[test]
    fn test_sort_deserializes_snake_case() {
        let sort: ProductSort = serde_json::from_str("\"price_desc\"").unwrap_or_default();
        assert_eq!(sort, ProductSort::PriceDesc);
    }
}
