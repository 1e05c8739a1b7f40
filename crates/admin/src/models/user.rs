//! User management types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use luxora_core::{UserId, UserRole};

/// Row of the admin user list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub order_count: i64,
    pub created_at: DateTime<Utc>,
}
