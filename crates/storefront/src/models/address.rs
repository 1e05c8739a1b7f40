//! Postal addresses for shipping and billing.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A postal address, stored as JSON on orders and payment methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[validate(length(min = 1, max = 120))]
    pub full_name: String,
    #[validate(length(min = 1, max = 200))]
    pub line1: String,
    #[validate(length(max = 200))]
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(max = 100))]
    pub region: Option<String>,
    #[validate(length(min = 2, max = 20))]
    pub postal_code: String,
    /// ISO 3166-1 alpha-2 country code.
    #[validate(length(equal = 2))]
    pub country: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> Address {
        Address {
            full_name: "Ines Laurent".to_string(),
            line1: "12 Rue de la Paix".to_string(),
            line2: None,
            city: "Paris".to_string(),
            region: None,
            postal_code: "75002".to_string(),
            country: "FR".to_string(),
            phone: None,
        }
    }

    #[test]
    fn test_valid_address() {
        assert!(address().validate().is_ok());
    }

    #[test]
    fn test_rejects_blank_and_bad_country() {
        let mut addr = address();
        addr.line1 = String::new();
        addr.country = "France".to_string();
        let errors = addr.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("line1"));
        assert!(fields.contains_key("country"));
    }
}
