//! Curated collection types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use luxora_core::slug::slugify;
use luxora_core::{CollectionId, ProductId, ProductStatus};

/// A collection with its member count.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub season: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A member product, in display order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CollectionProduct {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub status: ProductStatus,
    pub merchant_name: String,
    pub position: i32,
}

/// Collection edit page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDetail {
    #[serde(flatten)]
    pub collection: Collection,
    pub products: Vec<CollectionProduct>,
}

/// Collection fields set by create and update.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInput {
    #[validate(length(min = 1, max = 120), custom(function = "has_slug"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(length(max = 40))]
    pub season: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

const fn default_active() -> bool {
    true
}

fn has_slug(name: &str) -> Result<(), ValidationError> {
    slugify(name)
        .map(|_| ())
        .map_err(|_| ValidationError::new("slug"))
}

/// Replacement membership, in display order.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CollectionProductsInput {
    #[validate(length(max = 200))]
    pub product_ids: Vec<ProductId>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_input_defaults() {
        let input: CollectionInput = serde_json::from_str(r#"{"name":"Summer Edit"}"#).unwrap();
        assert!(input.validate().is_ok());
        assert!(input.is_active);
        assert_eq!(input.sort_order, 0);
        assert!(input.season.is_none());
    }

    #[test]
    fn test_input_rejects_bad_image_url() {
        let input: CollectionInput =
            serde_json::from_str(r#"{"name":"Summer Edit","imageUrl":"not a url"}"#).unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_membership_keeps_order() {
        let input: CollectionProductsInput =
            serde_json::from_str(r#"{"productIds":[3,1,2]}"#).unwrap();
        let ids: Vec<i32> = input.product_ids.iter().map(|id| id.as_i32()).collect();
        assert_eq!(ids, [3, 1, 2]);
    }
}
