//! Stored payment methods.
//!
//! Only tokenized card metadata is kept: brand, last four digits and expiry.

use chrono::{DateTime, Utc};
use serde::Serialize;

use luxora_core::PaymentMethodId;

use super::Address;

/// A saved card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub brand: String,
    pub last4: String,
    pub exp_month: i16,
    pub exp_year: i16,
    pub is_default: bool,
    pub billing_address: Address,
    pub created_at: DateTime<Utc>,
}

impl PaymentMethod {
    /// Whether the card has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        card_expired(self.exp_month, self.exp_year, now)
    }
}

/// Cards are valid through the end of their expiry month.
#[must_use]
pub fn card_expired(exp_month: i16, exp_year: i16, now: DateTime<Utc>) -> bool {
    use chrono::Datelike;

    let year = now.year();
    let month = i32::try_from(now.month()).unwrap_or(12);
    let exp_year = i32::from(exp_year);
    let exp_month = i32::from(exp_month);
    exp_year < year || (exp_year == year && exp_month < month)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_is_expired() {
        let card = PaymentMethod {
            id: PaymentMethodId::new(1),
            brand: "visa".to_string(),
            last4: "4242".to_string(),
            exp_month: 6,
            exp_year: 2026,
            is_default: true,
            billing_address: Address {
                full_name: "A".to_string(),
                line1: "1 Main St".to_string(),
                line2: None,
                city: "Austin".to_string(),
                region: Some("TX".to_string()),
                postal_code: "78701".to_string(),
                country: "US".to_string(),
                phone: None,
            },
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        };

        assert!(!card.is_expired(Utc.with_ymd_and_hms(2026, 6, 30, 0, 0, 0).unwrap()));
        assert!(card.is_expired(Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap()));
        assert!(card.is_expired(Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap()));
    }
}
