//! Role and status enums for Luxora entities.
//!
//! Each enum maps to a PostgreSQL enum in the `luxora` schema and serializes
//! in `SCREAMING_SNAKE_CASE` (`PENDING`, `ACTIVE`, ...), which is also what the
//! dashboards render as status badges.

use serde::{Deserialize, Serialize};

/// Error returned when a status string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

impl ParseStatusError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Error returned when a status change is not allowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot change {kind} status from {from} to {to}")]
pub struct TransitionError {
    /// Entity kind (`order`, `merchant`).
    pub kind: &'static str,
    /// Current status.
    pub from: String,
    /// Requested status.
    pub to: String,
}

/// Generates `as_str`, `Display` and `FromStr` for a status enum.
macro_rules! status_strings {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Wire/database representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ParseStatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseStatusError::new($kind, s)),
                }
            }
        }
    };
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "luxora.user_role", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Shops the storefront.
    #[default]
    Customer,
    /// Runs the platform; full access to the admin dashboard.
    Admin,
    /// Owns a merchant store; access to the merchant dashboard.
    Merchant,
}

status_strings!(UserRole, "user role", {
    Customer => "CUSTOMER",
    Admin => "ADMIN",
    Merchant => "MERCHANT",
});

impl UserRole {
    /// Whether this role may sign in to the dashboard binary.
    #[must_use]
    pub const fn can_use_dashboard(self) -> bool {
        matches!(self, Self::Admin | Self::Merchant)
    }
}

/// Merchant account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "luxora.merchant_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MerchantStatus {
    /// Applied, awaiting admin review.
    #[default]
    Pending,
    /// Selling on the storefront.
    Active,
    /// Hidden from the storefront; dashboard access revoked.
    Suspended,
}

status_strings!(MerchantStatus, "merchant status", {
    Pending => "PENDING",
    Active => "ACTIVE",
    Suspended => "SUSPENDED",
});

impl MerchantStatus {
    /// Whether an admin may move a merchant from `self` to `next`.
    ///
    /// Approving, suspending (which is also what "delete" does), rejecting a
    /// pending application and reinstating a suspended store are allowed.
    /// Nothing returns to `PENDING`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending | Self::Suspended, Self::Active)
                | (Self::Pending | Self::Active, Self::Suspended)
        )
    }

    /// Validate a lifecycle change.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] if the change is not allowed.
    pub fn transition(self, next: Self) -> Result<Self, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                kind: "merchant",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

/// Product listing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "luxora.product_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    /// Not yet published.
    #[default]
    Draft,
    /// Visible and purchasable.
    Active,
    /// Soft-deleted.
    Archived,
}

status_strings!(ProductStatus, "product status", {
    Draft => "DRAFT",
    Active => "ACTIVE",
    Archived => "ARCHIVED",
});

/// Order fulfillment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "luxora.order_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

status_strings!(OrderStatus, "order status", {
    Pending => "PENDING",
    Processing => "PROCESSING",
    Shipped => "SHIPPED",
    Delivered => "DELIVERED",
    Cancelled => "CANCELLED",
});

impl OrderStatus {
    /// Whether the order can no longer change.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether an admin may move an order from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }

    /// Validate a status change.
    ///
    /// Returns `Ok(None)` when `next` equals the current status (nothing to
    /// write) and `Ok(Some(next))` for an allowed change.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] if the change is not allowed.
    pub fn transition(self, next: Self) -> Result<Option<Self>, TransitionError> {
        if self == next {
            return Ok(None);
        }
        if self.can_transition_to(next) {
            Ok(Some(next))
        } else {
            Err(TransitionError {
                kind: "order",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

/// Order payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "luxora.payment_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
    Failed,
}

status_strings!(PaymentStatus, "payment status", {
    Pending => "PENDING",
    Paid => "PAID",
    Refunded => "REFUNDED",
    Failed => "FAILED",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("active".parse::<MerchantStatus>().unwrap(), MerchantStatus::Active);
        assert_eq!(" SHIPPED ".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("archived".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_status_serde_matches_badges() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
        let role: UserRole = serde_json::from_str("\"MERCHANT\"").unwrap();
        assert_eq!(role, UserRole::Merchant);
    }

    #[test]
    fn test_dashboard_roles() {
        assert!(UserRole::Admin.can_use_dashboard());
        assert!(UserRole::Merchant.can_use_dashboard());
        assert!(!UserRole::Customer.can_use_dashboard());
    }

    #[test]
    fn test_merchant_lifecycle() {
        use MerchantStatus::{Active, Pending, Suspended};

        assert_eq!(Pending.transition(Active).unwrap(), Active);
        assert_eq!(Active.transition(Suspended).unwrap(), Suspended);
        assert_eq!(Suspended.transition(Active).unwrap(), Active);
        assert_eq!(Pending.transition(Suspended).unwrap(), Suspended);
        assert!(Active.transition(Pending).is_err());
        assert!(Active.transition(Active).is_err());
    }

    #[test]
    fn test_order_transitions() {
        use OrderStatus::{Cancelled, Delivered, Pending, Processing, Shipped};

        assert_eq!(Pending.transition(Processing).unwrap(), Some(Processing));
        assert_eq!(Processing.transition(Shipped).unwrap(), Some(Shipped));
        assert_eq!(Shipped.transition(Delivered).unwrap(), Some(Delivered));
        assert_eq!(Pending.transition(Cancelled).unwrap(), Some(Cancelled));
        assert_eq!(Shipped.transition(Shipped).unwrap(), None);

        let err = Shipped.transition(Cancelled).unwrap_err();
        assert_eq!(err.to_string(), "cannot change order status from SHIPPED to CANCELLED");
        assert!(Delivered.transition(Processing).is_err());
        assert!(Cancelled.transition(Pending).is_err());
        assert!(Delivered.is_terminal() && Cancelled.is_terminal());
    }
}
