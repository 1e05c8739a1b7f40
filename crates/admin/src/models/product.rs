//! Catalog management types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use luxora_core::pricing::MAX_DISCOUNT_PERCENT;
use luxora_core::slug::slugify;
use luxora_core::{MerchantId, ProductId, ProductStatus};

/// A product as seen by the dashboards, whatever its status.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub merchant_id: MerchantId,
    pub merchant_name: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub discount_percent: i32,
    pub stock: i32,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub status: ProductStatus,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product fields set by create and update.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    /// Owning store. Required for admin creates; ignored for merchants.
    pub merchant_id: Option<MerchantId>,
    #[validate(length(min = 1, max = 200), custom(function = "has_slug"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[validate(length(min = 1, max = 80))]
    pub category: String,
    #[validate(custom(function = "positive_price"))]
    pub price: Decimal,
    #[serde(default)]
    #[validate(range(min = 0, max = MAX_DISCOUNT_PERCENT))]
    pub discount_percent: i32,
    #[validate(range(min = 0, max = 1_000_000))]
    pub stock: i32,
    #[serde(default)]
    #[validate(length(max = 12))]
    pub images: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub sizes: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub colors: Vec<String>,
    #[serde(default)]
    pub status: ProductStatus,
    /// Admin only; merchants cannot feature their own products.
    pub featured: Option<bool>,
}

impl ProductInput {
    /// Trimmed, non-empty option values.
    #[must_use]
    pub fn clean_list(values: &[String]) -> Vec<String> {
        values
            .iter()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .collect()
    }
}

fn has_slug(name: &str) -> Result<(), ValidationError> {
    slugify(name)
        .map(|_| ())
        .map_err(|_| ValidationError::new("slug"))
}

fn positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("positive"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(json: &str) -> ProductInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults() {
        let product = input(r#"{"name":"Linen Shirt","category":"Shirts","price":"89.00","stock":4}"#);
        assert!(product.validate().is_ok());
        assert_eq!(product.status, ProductStatus::Draft);
        assert_eq!(product.discount_percent, 0);
        assert!(product.featured.is_none());
    }

    #[test]
    fn test_rejects_bad_values() {
        let zero_price = input(r#"{"name":"Scarf","category":"Accessories","price":"0","stock":1}"#);
        assert!(zero_price.validate().is_err());

        let deep_discount = input(
            r#"{"name":"Scarf","category":"Accessories","price":"10","stock":1,"discountPercent":95}"#,
        );
        assert!(deep_discount.validate().is_err());

        let no_slug = input(r#"{"name":"!!!","category":"Accessories","price":"10","stock":1}"#);
        assert!(no_slug.validate().is_err());
    }

    #[test]
    fn test_clean_list() {
        let sizes = vec![" S ".to_string(), String::new(), "M".to_string()];
        assert_eq!(ProductInput::clean_list(&sizes), vec!["S", "M"]);
    }
}
