//! Authentication and role extractors for the dashboards.
//!
//! The signed-in staff member lives in the session under `current_staff`.
//! Admin routes take [`RequireAdmin`]; merchant routes take
//! [`RequireMerchant`], which re-reads the store status so a suspension
//! locks the owner out on their next request.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use luxora_core::{MerchantId, MerchantStatus, UserRole};

use crate::db::MerchantRepository;
use crate::models::{CurrentStaff, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in admin or merchant.
pub struct RequireStaff(pub CurrentStaff);

/// Extractor that requires a signed-in `ADMIN`.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_merchants(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentStaff);

/// Extractor that requires a signed-in `MERCHANT` whose store is not
/// suspended. Carries the store id every merchant query is scoped to.
pub struct RequireMerchant(pub CurrentStaff, pub MerchantId);

/// Rejection returned by the staff extractors.
#[derive(Debug)]
pub enum StaffRejection {
    /// Nobody is signed in.
    Unauthorized,
    /// Signed in, but the role or store status does not allow this.
    Forbidden(&'static str),
    /// The store status could not be read.
    Unavailable,
}

impl IntoResponse for StaffRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            Self::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn session_staff(parts: &Parts) -> Result<CurrentStaff, StaffRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(StaffRejection::Unauthorized)?;
    let staff = session
        .get::<CurrentStaff>(session_keys::CURRENT_STAFF)
        .await
        .ok()
        .flatten()
        .ok_or(StaffRejection::Unauthorized)?;

    tracing::Span::current().record("user_id", staff.id.as_i32());
    Ok(staff)
}

/// Decide whether a store in `status` may use the merchant dashboard.
const fn merchant_access(status: Option<MerchantStatus>) -> Result<(), StaffRejection> {
    match status {
        Some(MerchantStatus::Pending | MerchantStatus::Active) => Ok(()),
        Some(MerchantStatus::Suspended) => Err(StaffRejection::Forbidden("Store is suspended")),
        None => Err(StaffRejection::Forbidden("No store is linked to this account")),
    }
}

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = StaffRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_staff(parts).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = StaffRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let staff = session_staff(parts).await?;
        if !staff.is_admin() {
            return Err(StaffRejection::Forbidden("Admin access required"));
        }
        Ok(Self(staff))
    }
}

impl FromRequestParts<AppState> for RequireMerchant {
    type Rejection = StaffRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let staff = session_staff(parts).await?;
        let merchant_id = staff
            .merchant_id
            .filter(|_| staff.role == UserRole::Merchant)
            .ok_or(StaffRejection::Forbidden("Merchant access required"))?;

        let status = MerchantRepository::new(state.pool())
            .status(merchant_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, merchant_id = %merchant_id, "merchant status lookup failed");
                StaffRejection::Unavailable
            })?;
        merchant_access(status)?;

        Ok(Self(staff, merchant_id))
    }
}

/// Store the staff member in the session, cycling the session ID first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_staff(
    session: &Session,
    staff: &CurrentStaff,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_STAFF, staff).await
}

/// End the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub async fn clear_current_staff(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merchant_access_by_status() {
        assert!(merchant_access(Some(MerchantStatus::Active)).is_ok());
        assert!(merchant_access(Some(MerchantStatus::Pending)).is_ok());
        assert!(matches!(
            merchant_access(Some(MerchantStatus::Suspended)),
            Err(StaffRejection::Forbidden(_))
        ));
        assert!(matches!(
            merchant_access(None),
            Err(StaffRejection::Forbidden(_))
        ));
    }

    #[test]
    fn test_rejection_status_codes() {
        assert_eq!(
            StaffRejection::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            StaffRejection::Forbidden("Admin access required")
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
    }
}
