//! Admin merchant management: listing, onboarding, profile edits and the
//! approve / suspend / reinstate lifecycle.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use validator::Validate;

use luxora_core::pagination::{Page, PageParams, Paginated};
use luxora_core::{Email, MerchantId, MerchantStatus};

use crate::db::merchants::{MerchantFilter, MerchantProfileInput};
use crate::db::{MerchantRepository, UserRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::ValidatedJson;
use crate::middleware::RequireAdmin;
use crate::models::{MerchantDetail, MerchantSummary};
use crate::state::AppState;

/// `GET /api/admin/merchants` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<MerchantStatus>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListQuery {
    fn into_parts(self) -> (MerchantFilter, Page) {
        let page = Page::from_params(PageParams {
            page: self.page,
            per_page: self.per_page,
        });
        let filter = MerchantFilter {
            status: self.status,
            query: self.q,
        };
        (filter, page)
    }
}

/// Store profile as edited by an admin.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
    #[validate(url)]
    pub banner_url: Option<String>,
}

impl ProfileRequest {
    fn as_input(&self) -> MerchantProfileInput<'_> {
        MerchantProfileInput {
            name: &self.name,
            description: self.description.as_deref(),
            email: &self.email,
            phone: self.phone.as_deref(),
            logo_url: self.logo_url.as_deref(),
            banner_url: self.banner_url.as_deref(),
        }
    }
}

/// Open a store for an existing account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// Email of the account that will own the store.
    #[validate(email)]
    pub owner_email: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: ProfileRequest,
    /// Stores opened by an admin are `ACTIVE` unless stated otherwise.
    #[serde(default = "default_status")]
    pub status: MerchantStatus,
}

const fn default_status() -> MerchantStatus {
    MerchantStatus::Active
}

/// Lifecycle change.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: MerchantStatus,
}

async fn detail(state: &AppState, id: MerchantId) -> Result<MerchantDetail> {
    MerchantRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Merchant not found".to_string()))
}

/// Merchants with filters.
///
/// GET /api/admin/merchants
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<MerchantSummary>>> {
    let (filter, page) = query.into_parts();
    let merchants = MerchantRepository::new(state.pool()).list(&filter, page).await?;
    Ok(Json(merchants))
}

/// Merchant detail with live figures.
///
/// GET /api/admin/merchants/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<MerchantId>,
) -> Result<Json<MerchantDetail>> {
    Ok(Json(detail(&state, id).await?))
}

/// Open a store for an existing customer account.
///
/// POST /api/admin/merchants
#[tracing::instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(form): ValidatedJson<CreateRequest>,
) -> Result<(StatusCode, Json<MerchantDetail>)> {
    let email = Email::parse(&form.owner_email)
        .map_err(|_| AppError::Validation("invalid fields: owner_email".to_string()))?;
    let (owner, _) = UserRepository::new(state.pool())
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("No account with this email".to_string()))?;

    let id = MerchantRepository::new(state.pool())
        .create(owner, &form.profile.as_input(), form.status)
        .await?;
    state.stats().invalidate_all();

    tracing::info!(merchant_id = %id, owner_id = %owner, "merchant created");
    Ok((StatusCode::CREATED, Json(detail(&state, id).await?)))
}

/// Replace the store profile.
///
/// PUT /api/admin/merchants/{id}
#[tracing::instrument(skip(state, _admin, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<MerchantId>,
    ValidatedJson(form): ValidatedJson<ProfileRequest>,
) -> Result<Json<MerchantDetail>> {
    MerchantRepository::new(state.pool())
        .update_profile(id, &form.as_input())
        .await?;
    Ok(Json(detail(&state, id).await?))
}

/// "Delete" a merchant: stores are suspended, never removed, because past
/// orders reference them.
///
/// DELETE /api/admin/merchants/{id}
#[tracing::instrument(skip(state, _admin))]
pub async fn suspend(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<MerchantId>,
) -> Result<StatusCode> {
    MerchantRepository::new(state.pool())
        .transition(id, MerchantStatus::Suspended)
        .await?;
    state.stats().invalidate_all();

    tracing::info!(merchant_id = %id, "merchant suspended");
    Ok(StatusCode::NO_CONTENT)
}

/// Approve, reject, suspend or reinstate.
///
/// POST /api/admin/merchants/{id}/status
#[tracing::instrument(skip(state, _admin, form), fields(status = %form.status))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<MerchantId>,
    Json(form): Json<StatusRequest>,
) -> Result<Json<MerchantDetail>> {
    let status = MerchantRepository::new(state.pool())
        .transition(id, form.status)
        .await?;
    state.stats().invalidate_all();
    let merchant_id = id.to_string();
    add_breadcrumb(
        "merchant",
        "status changed",
        Some(&[("merchant_id", merchant_id.as_str()), ("status", status.as_str())]),
    );

    tracing::info!(merchant_id = %id, %status, "merchant status changed");
    Ok(Json(detail(&state, id).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults_to_active() {
        let form: CreateRequest = serde_json::from_str(
            r#"{"ownerEmail":"mara@atelier.test","name":"Atelier Mara","email":"hello@atelier.test"}"#,
        )
        .unwrap();
        assert!(form.validate().is_ok());
        assert_eq!(form.status, MerchantStatus::Active);
        assert!(form.profile.logo_url.is_none());
    }

    #[test]
    fn test_profile_validation() {
        let form: ProfileRequest = serde_json::from_str(
            r#"{"name":"A","email":"nope","logoUrl":"not a url"}"#,
        )
        .unwrap();
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["name", "email", "logo_url"] {
            assert!(fields.contains_key(field), "{field} should fail");
        }
    }

    #[test]
    fn test_list_query_parts() {
        let query = ListQuery {
            status: Some(MerchantStatus::Pending),
            per_page: Some(0),
            ..ListQuery::default()
        };
        let (filter, page) = query.into_parts();
        assert_eq!(filter.status, Some(MerchantStatus::Pending));
        assert_eq!(page.per_page, 1);
    }
}
