//! User repository: staff sign-in and user management.

use sqlx::{PgPool, Postgres, QueryBuilder};

use luxora_core::pagination::{Page, Paginated};
use luxora_core::{Email, MerchantId, MerchantStatus, UserId, UserRole};

use super::{RepositoryError, search_pattern};
use crate::models::{CurrentStaff, UserSummary};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct StaffRow {
    id: UserId,
    email: String,
    name: String,
    role: UserRole,
    merchant_id: Option<MerchantId>,
    merchant_status: Option<MerchantStatus>,
}

impl StaffRow {
    fn into_staff(self) -> Result<(CurrentStaff, Option<MerchantStatus>), RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok((
            CurrentStaff {
                id: self.id,
                email,
                name: self.name,
                role: self.role,
                merchant_id: self.merchant_id,
            },
            self.merchant_status,
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    staff: StaffRow,
    password_hash: String,
}

const STAFF_SELECT: &str = r"
    SELECT u.id, u.email, u.name, u.role, m.id AS merchant_id, m.status AS merchant_status
    FROM luxora.users u
    LEFT JOIN luxora.merchants m ON m.owner_id = u.id
";

const SUMMARY_SELECT: &str = r"
    SELECT u.id, u.email, u.name, u.phone, u.role, u.created_at,
           (SELECT COUNT(*) FROM luxora.orders o WHERE o.user_id = u.id) AS order_count
    FROM luxora.users u
    WHERE TRUE
";

/// A signed-in staff member and, for merchants, their store's status.
pub type StaffAccount = (CurrentStaff, Option<MerchantStatus>);

/// User list filters.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    /// Matches name or email.
    pub query: Option<String>,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    if let Some(role) = filter.role {
        qb.push(" AND u.role = ").push_bind(role);
    }
    if let Some(pattern) = search_pattern(filter.query.as_deref()) {
        qb.push(" AND (u.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user accounts as seen by the dashboards.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an account, its store and its password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(StaffAccount, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r"
            SELECT u.id, u.email, u.name, u.role, u.password_hash,
                   m.id AS merchant_id, m.status AS merchant_status
            FROM luxora.users u
            LEFT JOIN luxora.merchants m ON m.owner_id = u.id
            WHERE LOWER(u.email) = LOWER($1)
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((r.staff.into_staff()?, r.password_hash)))
            .transpose()
    }

    /// Reload an account and its store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_staff(&self, id: UserId) -> Result<Option<StaffAccount>, RepositoryError> {
        let row = sqlx::query_as::<_, StaffRow>(&format!("{STAFF_SELECT} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(StaffRow::into_staff).transpose()
    }

    /// Id and role of the account with this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(UserId, UserRole)>, RepositoryError> {
        let row = sqlx::query_as::<_, (UserId, UserRole)>(
            "SELECT id, role FROM luxora.users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// List users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &UserFilter,
        page: Page,
    ) -> Result<Paginated<UserSummary>, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM luxora.users u WHERE TRUE");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(SUMMARY_SELECT);
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY u.created_at DESC, u.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let users: Vec<UserSummary> = qb.build_query_as().fetch_all(self.pool).await?;
        Ok(Paginated::new(users, page, total))
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn set_role(&self, id: UserId, role: UserRole) -> Result<UserSummary, RepositoryError> {
        let updated = sqlx::query("UPDATE luxora.users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role)
            .execute(self.pool)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query_as::<_, UserSummary>(&format!("{SUMMARY_SELECT} AND u.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}
