//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use luxora_core::{Email, UserId, UserRole};

/// A Luxora account as seen by its owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shopper preferences, stored as JSON on the user row.
///
/// Missing keys fall back to defaults so older rows stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    /// Marketing emails.
    pub newsletter: bool,
    /// Shipping and delivery notifications.
    pub order_updates: bool,
    /// Display currency (ISO 4217).
    pub currency: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            newsletter: false,
            order_updates: true,
            currency: "USD".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_fill_missing_keys() {
        let prefs: Preferences = serde_json::from_str(r#"{"newsletter": true}"#).unwrap();
        assert!(prefs.newsletter);
        assert!(prefs.order_updates);
        assert_eq!(prefs.currency, "USD");
    }

    #[test]
    fn test_preferences_camel_case() {
        let json = serde_json::to_value(Preferences::default()).unwrap();
        assert_eq!(json["orderUpdates"], true);
    }
}
