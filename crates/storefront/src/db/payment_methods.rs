//! Stored payment method repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use luxora_core::{PaymentMethodId, UserId};

use super::RepositoryError;
use crate::models::{Address, PaymentMethod};

#[derive(Debug, sqlx::FromRow)]
struct PaymentMethodRow {
    id: PaymentMethodId,
    brand: String,
    last4: String,
    exp_month: i16,
    exp_year: i16,
    is_default: bool,
    billing_address: Json<Address>,
    created_at: DateTime<Utc>,
}

impl From<PaymentMethodRow> for PaymentMethod {
    fn from(row: PaymentMethodRow) -> Self {
        Self {
            id: row.id,
            brand: row.brand,
            last4: row.last4,
            exp_month: row.exp_month,
            exp_year: row.exp_year,
            is_default: row.is_default,
            billing_address: row.billing_address.0,
            created_at: row.created_at,
        }
    }
}

const PAYMENT_METHOD_COLUMNS: &str =
    "id, brand, last4, exp_month, exp_year, is_default, billing_address, created_at";

/// Card metadata for a new payment method.
#[derive(Debug)]
pub struct NewPaymentMethod<'a> {
    pub brand: &'a str,
    pub last4: &'a str,
    pub exp_month: i16,
    pub exp_year: i16,
    pub billing_address: &'a Address,
    pub make_default: bool,
}

/// Repository for a user's saved cards.
pub struct PaymentMethodRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentMethodRepository<'a> {
    /// Create a new payment method repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's cards, default first, then newest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user: UserId) -> Result<Vec<PaymentMethod>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentMethodRow>(&format!(
            r"
            SELECT {PAYMENT_METHOD_COLUMNS}
            FROM luxora.payment_methods
            WHERE user_id = $1
            ORDER BY is_default DESC, created_at DESC, id DESC
            "
        ))
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Save a card. The user's first card always becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add(
        &self,
        user: UserId,
        card: &NewPaymentMethod<'_>,
    ) -> Result<PaymentMethod, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let has_default: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM luxora.payment_methods WHERE user_id = $1 AND is_default)",
        )
        .bind(user)
        .fetch_one(&mut *tx)
        .await?;

        let is_default = card.make_default || !has_default;
        if is_default && has_default {
            sqlx::query(
                "UPDATE luxora.payment_methods SET is_default = FALSE WHERE user_id = $1 AND is_default",
            )
            .bind(user)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query_as::<_, PaymentMethodRow>(&format!(
            r"
            INSERT INTO luxora.payment_methods
                (user_id, brand, last4, exp_month, exp_year, is_default, billing_address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PAYMENT_METHOD_COLUMNS}
            "
        ))
        .bind(user)
        .bind(card.brand)
        .bind(card.last4)
        .bind(card.exp_month)
        .bind(card.exp_year)
        .bind(is_default)
        .bind(Json(card.billing_address))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Make one of the user's cards the default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the card is not the user's.
    pub async fn set_default(
        &self,
        user: UserId,
        id: PaymentMethodId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM luxora.payment_methods WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user)
        .fetch_one(&mut *tx)
        .await?;
        if !exists {
            return Err(RepositoryError::NotFound);
        }

        // Clear first so the partial unique index never sees two defaults.
        sqlx::query(
            "UPDATE luxora.payment_methods SET is_default = FALSE WHERE user_id = $1 AND is_default",
        )
        .bind(user)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE luxora.payment_methods SET is_default = TRUE WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Remove a card. If it was the default, the newest remaining card
    /// takes over.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the card is not the user's.
    pub async fn delete(&self, user: UserId, id: PaymentMethodId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let was_default = sqlx::query_scalar::<_, bool>(
            "DELETE FROM luxora.payment_methods WHERE id = $1 AND user_id = $2 RETURNING is_default",
        )
        .bind(id)
        .bind(user)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if was_default {
            sqlx::query(
                r"
                UPDATE luxora.payment_methods SET is_default = TRUE
                WHERE id = (
                    SELECT id FROM luxora.payment_methods
                    WHERE user_id = $1
                    ORDER BY created_at DESC, id DESC
                    LIMIT 1
                )
                ",
            )
            .bind(user)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
