//! Merchant types for the admin merchant pages and merchant settings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use luxora_core::{MerchantId, MerchantStatus, UserId};

/// Row of the merchant list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MerchantSummary {
    pub id: MerchantId,
    pub name: String,
    pub slug: String,
    pub email: String,
    pub status: MerchantStatus,
    pub owner_name: String,
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Figures computed from live data for the merchant detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MerchantLiveStats {
    pub product_count: i64,
    pub active_product_count: i64,
    pub order_count: i64,
    pub units_sold: i64,
    pub revenue: Decimal,
}

/// Merchant detail page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantDetail {
    pub id: MerchantId,
    pub owner_id: UserId,
    pub owner_name: String,
    pub owner_email: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub status: MerchantStatus,
    pub stats: MerchantLiveStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store settings edited by the merchant.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MerchantSettings {
    pub id: MerchantId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub status: MerchantStatus,
    pub payout_email: Option<String>,
    /// `daily`, `weekly` or `monthly`.
    pub payout_schedule: String,
    pub shipping_origin: Option<String>,
    pub processing_days: i32,
    pub free_shipping_threshold: Option<Decimal>,
    pub notify_new_order: bool,
    pub notify_low_stock: bool,
    pub notify_reviews: bool,
    pub low_stock_threshold: i32,
    pub return_policy: Option<String>,
    pub shipping_policy: Option<String>,
    pub privacy_policy: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// Accepted payout schedules.
pub const PAYOUT_SCHEDULES: &[&str] = &["daily", "weekly", "monthly"];

/// Partial settings update. Absent fields are left alone; blank text in an
/// optional field clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsPatch {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
    #[validate(url)]
    pub banner_url: Option<String>,
    #[validate(email)]
    pub payout_email: Option<String>,
    #[validate(custom(function = "valid_payout_schedule"))]
    pub payout_schedule: Option<String>,
    #[validate(length(max = 200))]
    pub shipping_origin: Option<String>,
    #[validate(range(min = 0, max = 60))]
    pub processing_days: Option<i32>,
    #[validate(custom(function = "non_negative"))]
    pub free_shipping_threshold: Option<Decimal>,
    pub notify_new_order: Option<bool>,
    pub notify_low_stock: Option<bool>,
    pub notify_reviews: Option<bool>,
    #[validate(range(min = 0, max = 10_000))]
    pub low_stock_threshold: Option<i32>,
    #[validate(length(max = 10_000))]
    pub return_policy: Option<String>,
    #[validate(length(max = 10_000))]
    pub shipping_policy: Option<String>,
    #[validate(length(max = 10_000))]
    pub privacy_policy: Option<String>,
    #[validate(length(max = 70))]
    pub seo_title: Option<String>,
    #[validate(length(max = 160))]
    pub seo_description: Option<String>,
    #[validate(length(max = 20))]
    pub seo_keywords: Option<Vec<String>>,
}

impl SettingsPatch {
    /// Whether no field was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.logo_url.is_none()
            && self.banner_url.is_none()
            && self.payout_email.is_none()
            && self.payout_schedule.is_none()
            && self.shipping_origin.is_none()
            && self.processing_days.is_none()
            && self.free_shipping_threshold.is_none()
            && self.notify_new_order.is_none()
            && self.notify_low_stock.is_none()
            && self.notify_reviews.is_none()
            && self.low_stock_threshold.is_none()
            && self.return_policy.is_none()
            && self.shipping_policy.is_none()
            && self.privacy_policy.is_none()
            && self.seo_title.is_none()
            && self.seo_description.is_none()
            && self.seo_keywords.is_none()
    }
}

fn valid_payout_schedule(value: &str) -> Result<(), ValidationError> {
    if PAYOUT_SCHEDULES.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("payout_schedule"))
    }
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        Err(ValidationError::new("non_negative"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_patch() {
        let patch: SettingsPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());

        let patch: SettingsPatch = serde_json::from_str(r#"{"notifyReviews":false}"#).unwrap();
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<SettingsPatch>(r#"{"status":"ACTIVE"}"#).is_err());
    }

    #[test]
    fn test_patch_validation() {
        let patch: SettingsPatch =
            serde_json::from_str(r#"{"payoutSchedule":"weekly","processingDays":3}"#).unwrap();
        assert!(patch.validate().is_ok());

        let patch: SettingsPatch = serde_json::from_str(r#"{"payoutSchedule":"hourly"}"#).unwrap();
        assert!(patch.validate().is_err());

        let patch: SettingsPatch =
            serde_json::from_str(r#"{"freeShippingThreshold":"-1.00"}"#).unwrap();
        assert!(patch.validate().is_err());

        let patch: SettingsPatch = serde_json::from_str(r#"{"processingDays":90}"#).unwrap();
        assert!(patch.validate().is_err());
    }
}
