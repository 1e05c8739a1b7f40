//! Account routes: profile, password, order history and saved cards.
//!
//! Every route requires a signed-in user and only touches that user's rows.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use luxora_core::PaymentMethodId;
use luxora_core::pagination::{Page, PageParams, Paginated};

use crate::db::payment_methods::NewPaymentMethod;
use crate::db::{OrderRepository, PaymentMethodRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::extract::ValidatedJson;
use crate::middleware::RequireAuth;
use crate::models::{
    Address, OrderDetail, OrderSummary, PaymentMethod, Preferences, User, card_expired,
};
use crate::services::AuthService;
use crate::state::AppState;

// =============================================================================
// Profile
// =============================================================================

/// Profile of the signed-in user.
///
/// GET /api/account/profile
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<User>> {
    UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Profile update body. Omitted preferences are left unchanged.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(custom(function = "valid_preferences"))]
    pub preferences: Option<Preferences>,
}

fn valid_preferences(prefs: &Preferences) -> std::result::Result<(), ValidationError> {
    let currency_ok =
        prefs.currency.len() == 3 && prefs.currency.chars().all(|c| c.is_ascii_uppercase());
    if currency_ok {
        Ok(())
    } else {
        Err(ValidationError::new("currency"))
    }
}

/// Update name, phone and preferences.
///
/// PUT /api/account/profile
#[tracing::instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ValidatedJson(form): ValidatedJson<ProfileRequest>,
) -> Result<Json<User>> {
    let users = UserRepository::new(state.pool());
    let preferences = match form.preferences {
        Some(prefs) => prefs,
        None => {
            users
                .get_by_id(user.id)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?
                .preferences
        }
    };
    let phone = form.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());

    let updated = users
        .update_profile(user.id, form.name.trim(), phone, &preferences)
        .await?;
    Ok(Json(updated))
}

/// Password change body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    pub new_password: String,
}

/// Change the password.
///
/// PUT /api/account/password
#[tracing::instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ValidatedJson(form): ValidatedJson<PasswordRequest>,
) -> Result<StatusCode> {
    AuthService::new(state.pool())
        .change_password(user.id, &form.current_password, &form.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Orders
// =============================================================================

/// Order history, newest first.
///
/// GET /api/account/orders
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<OrderSummary>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id, Page::from(params))
        .await?;
    Ok(Json(orders))
}

/// One order with items and timeline.
///
/// GET /api/account/orders/{orderNumber}
pub async fn order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_number): Path<String>,
) -> Result<Json<OrderDetail>> {
    OrderRepository::new(state.pool())
        .get_for_user(user.id, &order_number.to_uppercase())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

// =============================================================================
// Payment Methods
// =============================================================================

/// Saved cards, default first.
///
/// GET /api/account/payment-methods
pub async fn payment_methods(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<PaymentMethod>>> {
    let methods = PaymentMethodRepository::new(state.pool())
        .list(user.id)
        .await?;
    Ok(Json(methods))
}

/// New card body. Only tokenized metadata is accepted.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodRequest {
    #[validate(length(min = 1, max = 30))]
    pub brand: String,
    #[validate(custom(function = "four_digits"))]
    pub last4: String,
    #[validate(range(min = 1, max = 12))]
    pub exp_month: i16,
    #[validate(range(min = 2000, max = 2100))]
    pub exp_year: i16,
    #[validate(nested)]
    pub billing_address: Address,
    #[serde(default)]
    pub make_default: bool,
}

fn four_digits(value: &str) -> std::result::Result<(), ValidationError> {
    if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("last4"))
    }
}

/// Save a card. The first card becomes the default.
///
/// POST /api/account/payment-methods
#[tracing::instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn add_payment_method(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ValidatedJson(form): ValidatedJson<PaymentMethodRequest>,
) -> Result<(StatusCode, Json<PaymentMethod>)> {
    if card_expired(form.exp_month, form.exp_year, Utc::now()) {
        return Err(AppError::BadRequest("Card has expired".to_string()));
    }

    let card = NewPaymentMethod {
        brand: form.brand.trim(),
        last4: &form.last4,
        exp_month: form.exp_month,
        exp_year: form.exp_year,
        billing_address: &form.billing_address,
        make_default: form.make_default,
    };
    let method = PaymentMethodRepository::new(state.pool())
        .add(user.id, &card)
        .await?;
    Ok((StatusCode::CREATED, Json(method)))
}

/// Make a card the default.
///
/// PUT /api/account/payment-methods/{id}/default
pub async fn set_default_payment_method(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<PaymentMethodId>,
) -> Result<Json<Vec<PaymentMethod>>> {
    let methods = PaymentMethodRepository::new(state.pool());
    methods.set_default(user.id, id).await?;
    Ok(Json(methods.list(user.id).await?))
}

/// Remove a card.
///
/// DELETE /api/account/payment-methods/{id}
pub async fn delete_payment_method(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<PaymentMethodId>,
) -> Result<StatusCode> {
    PaymentMethodRepository::new(state.pool())
        .delete(user.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
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
    fn test_last4_validation() {
        let mut card = PaymentMethodRequest {
            brand: "visa".to_string(),
            last4: "4242".to_string(),
            exp_month: 12,
            exp_year: 2030,
            billing_address: address(),
            make_default: false,
        };
        assert!(card.validate().is_ok());

        card.last4 = "42a2".to_string();
        assert!(card.validate().is_err());

        card.last4 = "424242".to_string();
        assert!(card.validate().is_err());
    }

    #[test]
    fn test_billing_address_is_validated() {
        let mut address = address();
        address.country = "France".to_string();
        let card = PaymentMethodRequest {
            brand: "visa".to_string(),
            last4: "4242".to_string(),
            exp_month: 1,
            exp_year: 2031,
            billing_address: address,
            make_default: true,
        };
        assert!(card.validate().is_err());
    }

    #[test]
    fn test_currency_must_be_iso_code() {
        let mut prefs = Preferences::default();
        assert!(valid_preferences(&prefs).is_ok());
        prefs.currency = "euro".to_string();
        assert!(valid_preferences(&prefs).is_err());
    }
}
