//! Catalog types: products, reviews, collections and merchant storefronts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use luxora_core::{CollectionId, MerchantId, ProductId, ReviewId};

/// Product as shown in grids and listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub price: Decimal,
    pub discount_percent: i32,
    /// Price after the product discount.
    pub sale_price: Decimal,
    /// First image, if any.
    pub image: Option<String>,
    pub in_stock: bool,
    pub featured: bool,
    pub merchant_name: String,
    pub merchant_slug: String,
    pub rating: RatingSummary,
}

/// Full product page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub discount_percent: i32,
    pub sale_price: Decimal,
    pub stock: i32,
    pub in_stock: bool,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub featured: bool,
    pub merchant_id: MerchantId,
    pub merchant_name: String,
    pub merchant_slug: String,
    pub rating: RatingSummary,
    pub created_at: DateTime<Utc>,
}

/// Average rating and number of reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Mean rating to one decimal; `None` when there are no reviews.
    pub average: Option<Decimal>,
    pub count: i64,
}

/// A product review.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub rating: i16,
    pub comment: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Collection as listed on the collections page.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub id: CollectionId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub season: Option<String>,
    pub image_url: Option<String>,
    /// Number of visible products in the collection.
    pub product_count: i64,
}

/// Collection page with its products in curated order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDetail {
    #[serde(flatten)]
    pub collection: CollectionSummary,
    pub products: Vec<ProductCard>,
}

/// Public merchant profile.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MerchantProfile {
    pub id: MerchantId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub return_policy: Option<String>,
    pub shipping_policy: Option<String>,
    pub privacy_policy: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Vec<String>,
    pub free_shipping_threshold: Option<Decimal>,
    pub processing_days: i32,
    pub created_at: DateTime<Utc>,
}

/// Merchant storefront page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantStorefront {
    #[serde(flatten)]
    pub merchant: MerchantProfile,
    pub products: Vec<ProductCard>,
}
