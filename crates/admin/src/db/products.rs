//! Product repository for catalog management.
//!
//! Every method takes an optional owning merchant. Admin routes pass `None`
//! and see the whole catalog; merchant routes pass their own id, and rows of
//! other merchants behave as if they did not exist.

use sqlx::{PgPool, Postgres, QueryBuilder};

use luxora_core::pagination::{Page, Paginated};
use luxora_core::slug::slugify;
use luxora_core::{MerchantId, ProductId, ProductStatus};

use super::{RepositoryError, SlugTable, free_slug, search_pattern};
use crate::models::{Product, ProductInput};

const PRODUCT_SELECT: &str = r"
    SELECT p.id, p.merchant_id, m.name AS merchant_name, p.name, p.slug, p.description,
           p.category, p.price, p.discount_percent, p.stock, p.images, p.sizes, p.colors,
           p.status, p.featured, p.created_at, p.updated_at
    FROM luxora.products p
    JOIN luxora.merchants m ON m.id = p.merchant_id
    WHERE TRUE
";

/// Product list filters.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub status: Option<ProductStatus>,
    pub merchant_id: Option<MerchantId>,
    /// Matches name, slug or category.
    pub query: Option<String>,
}

fn push_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    owner: Option<MerchantId>,
    filter: &ProductFilter,
) {
    if let Some(merchant) = owner.or(filter.merchant_id) {
        qb.push(" AND p.merchant_id = ").push_bind(merchant);
    }
    if let Some(status) = filter.status {
        qb.push(" AND p.status = ").push_bind(status);
    }
    if let Some(pattern) = search_pattern(filter.query.as_deref()) {
        qb.push(" AND (p.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.slug ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.category ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn push_owner(qb: &mut QueryBuilder<'_, Postgres>, owner: Option<MerchantId>) {
    if let Some(merchant) = owner {
        qb.push(" AND p.merchant_id = ").push_bind(merchant);
    }
}

/// Repository for products across all statuses.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        owner: Option<MerchantId>,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<Paginated<Product>, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM luxora.products p WHERE TRUE",
        );
        push_filters(&mut count, owner, filter);
        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        push_filters(&mut qb, owner, filter);
        qb.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let products: Vec<Product> = qb.build_query_as().fetch_all(self.pool).await?;
        Ok(Paginated::new(products, page, total))
    }

    /// Get a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: ProductId,
        owner: Option<MerchantId>,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        qb.push(" AND p.id = ").push_bind(id);
        push_owner(&mut qb, owner);

        let product = qb.build_query_as().fetch_optional(self.pool).await?;
        Ok(product)
    }

    /// Create a product under `merchant` with a free slug derived from its
    /// name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the merchant does not exist.
    pub async fn create(
        &self,
        merchant: MerchantId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let base = slugify(&input.name).map_err(|e| RepositoryError::Invalid(e.to_string()))?;
        let mut tx = self.pool.begin().await?;

        let merchant_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM luxora.merchants WHERE id = $1)")
                .bind(merchant)
                .fetch_one(&mut *tx)
                .await?;
        if !merchant_exists {
            return Err(RepositoryError::NotFound);
        }

        let slug = free_slug(&mut tx, SlugTable::Products, &base).await?;

        let id = sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO luxora.products
                (merchant_id, name, slug, description, category, price, discount_percent,
                 stock, images, sizes, colors, status, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            ",
        )
        .bind(merchant)
        .bind(input.name.trim())
        .bind(&slug)
        .bind(input.description.trim())
        .bind(input.category.trim())
        .bind(input.price)
        .bind(input.discount_percent)
        .bind(input.stock)
        .bind(ProductInput::clean_list(&input.images))
        .bind(ProductInput::clean_list(&input.sizes))
        .bind(ProductInput::clean_list(&input.colors))
        .bind(input.status)
        .bind(input.featured.unwrap_or(false))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::on_unique(e, "slug already exists"))?;

        tx.commit().await?;

        self.get(id, None).await?.ok_or(RepositoryError::NotFound)
    }

    /// Replace a product's fields. The slug is kept; `featured` is only
    /// written when supplied.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist or
    /// belongs to another merchant.
    pub async fn update(
        &self,
        id: ProductId,
        owner: Option<MerchantId>,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE luxora.products
            SET name = $3, description = $4, category = $5, price = $6,
                discount_percent = $7, stock = $8, images = $9, sizes = $10,
                colors = $11, status = $12, featured = COALESCE($13, featured)
            WHERE id = $1 AND ($2::int IS NULL OR merchant_id = $2)
            ",
        )
        .bind(id)
        .bind(owner)
        .bind(input.name.trim())
        .bind(input.description.trim())
        .bind(input.category.trim())
        .bind(input.price)
        .bind(input.discount_percent)
        .bind(input.stock)
        .bind(ProductInput::clean_list(&input.images))
        .bind(ProductInput::clean_list(&input.sizes))
        .bind(ProductInput::clean_list(&input.colors))
        .bind(input.status)
        .bind(input.featured)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id, owner).await?.ok_or(RepositoryError::NotFound)
    }

    /// Archive a product. Archived products disappear from the storefront but
    /// stay referenced by past orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist or
    /// belongs to another merchant.
    pub async fn archive(
        &self,
        id: ProductId,
        owner: Option<MerchantId>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE luxora.products
            SET status = 'ARCHIVED', featured = FALSE
            WHERE id = $1 AND ($2::int IS NULL OR merchant_id = $2)
            ",
        )
        .bind(id)
        .bind(owner)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
