//! Session-related types for dashboard authentication.

use serde::{Deserialize, Serialize};

use luxora_core::{Email, MerchantId, UserId, UserRole};

/// Session-stored staff identity.
///
/// Minimal data stored in the session to identify the signed-in admin or
/// merchant owner. The merchant's status is re-read on every merchant
/// request, so a suspension takes effect immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStaff {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// `ADMIN` or `MERCHANT`.
    pub role: UserRole,
    /// Store owned by a merchant user.
    pub merchant_id: Option<MerchantId>,
}

impl CurrentStaff {
    /// Whether this is a platform administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Session keys for dashboard authentication data.
pub mod keys {
    /// Key for storing the current signed-in staff member.
    pub const CURRENT_STAFF: &str = "current_staff";
}
