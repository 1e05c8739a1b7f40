//! Authentication routes: staff login, logout, session lookup and public
//! merchant applications.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use validator::Validate;

use luxora_core::{MerchantId, MerchantStatus};

use crate::db::UserRepository;
use crate::db::merchants::MerchantProfileInput;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::extract::ValidatedJson;
use crate::middleware::{RequireStaff, clear_current_staff, set_current_staff};
use crate::models::CurrentStaff;
use crate::services::AuthService;
use crate::state::AppState;

/// Login form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// The signed-in staff member as returned by login and `me`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    #[serde(flatten)]
    pub staff: CurrentStaff,
    /// Status of a merchant's store; `None` for admins.
    pub merchant_status: Option<MerchantStatus>,
}

/// Merchant application form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MerchantRegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub password: String,
    #[validate(length(min = 2, max = 120))]
    pub store_name: String,
    #[validate(length(max = 2000))]
    pub store_description: Option<String>,
    /// Public contact address; defaults to the account email.
    #[validate(email)]
    pub store_email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
}

/// Reply to an accepted merchant application.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationReceived {
    pub merchant_id: MerchantId,
    pub status: MerchantStatus,
}

/// Staff login. Customers are refused with 403.
///
/// POST /api/auth/login
#[tracing::instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ValidatedJson(form): ValidatedJson<LoginRequest>,
) -> Result<Json<SessionInfo>> {
    let (staff, merchant_status) = AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
        .inspect_err(|_| tracing::warn!("failed dashboard login attempt"))?;

    set_current_staff(&session, &staff)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&staff.id, Some(staff.email.as_str()));

    tracing::info!(user_id = %staff.id, role = %staff.role, "staff logged in");
    Ok(Json(SessionInfo {
        staff,
        merchant_status,
    }))
}

/// End the session.
///
/// POST /api/auth/logout
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_staff(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The signed-in staff member, reloaded so role changes show up.
///
/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    session: Session,
    RequireStaff(current): RequireStaff,
) -> Result<Json<SessionInfo>> {
    let account = UserRepository::new(state.pool()).get_staff(current.id).await?;
    if let Some((staff, merchant_status)) =
        account.filter(|(staff, _)| staff.role.can_use_dashboard())
    {
        return Ok(Json(SessionInfo {
            staff,
            merchant_status,
        }));
    }

    // Account removed or demoted while signed in
    let _ = clear_current_staff(&session).await;
    Err(AppError::Unauthorized("Authentication required".to_string()))
}

/// Public merchant application. The store starts `PENDING` until an admin
/// approves it; the applicant is not signed in.
///
/// POST /api/merchant/register
#[tracing::instrument(skip(state, form), fields(store = %form.store_name))]
pub async fn register_merchant(
    State(state): State<AppState>,
    ValidatedJson(form): ValidatedJson<MerchantRegisterRequest>,
) -> Result<(StatusCode, Json<ApplicationReceived>)> {
    let store = MerchantProfileInput {
        name: &form.store_name,
        description: form.store_description.as_deref(),
        email: form.store_email.as_deref().unwrap_or(&form.email),
        phone: form.phone.as_deref(),
        logo_url: None,
        banner_url: None,
    };

    let merchant_id = AuthService::new(state.pool())
        .register_merchant(&form.email, &form.name, &form.password, store)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplicationReceived {
            merchant_id,
            status: MerchantStatus::Pending,
        }),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_merchant_application_validation() {
        let form: MerchantRegisterRequest = serde_json::from_str(
            r#"{"email":"owner@atelier.test","name":"Mara","password":"long enough","storeName":"Atelier Mara"}"#,
        )
        .unwrap();
        assert!(form.validate().is_ok());

        let form: MerchantRegisterRequest = serde_json::from_str(
            r#"{"email":"owner","name":"","password":"x","storeName":"A","storeEmail":"nope"}"#,
        )
        .unwrap();
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["email", "name", "store_name", "store_email"] {
            assert!(fields.contains_key(field), "{field} should fail");
        }
    }

    #[test]
    fn test_session_info_is_flat() {
        let staff: CurrentStaff = serde_json::from_str(
            r#"{"id":4,"email":"mara@atelier.test","name":"Mara","role":"MERCHANT","merchantId":2}"#,
        )
        .unwrap();
        let json = serde_json::to_value(SessionInfo {
            staff,
            merchant_status: Some(MerchantStatus::Active),
        })
        .unwrap();
        assert_eq!(json["role"], "MERCHANT");
        assert_eq!(json["merchantId"], 2);
        assert_eq!(json["merchantStatus"], "ACTIVE");
    }
}
