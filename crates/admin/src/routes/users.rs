//! Admin user management.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use luxora_core::pagination::{Page, PageParams, Paginated};
use luxora_core::{UserId, UserRole};

use crate::db::{RepositoryError, UserRepository};
use crate::db::users::UserFilter;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAdmin;
use crate::models::{CurrentStaff, UserSummary};
use crate::state::AppState;

/// `GET /api/admin/users` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub role: Option<UserRole>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListQuery {
    fn into_parts(self) -> (UserFilter, Page) {
        let page = Page::from_params(PageParams {
            page: self.page,
            per_page: self.per_page,
        });
        let filter = UserFilter {
            role: self.role,
            query: self.q,
        };
        (filter, page)
    }
}

/// Role change body.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: UserRole,
}

fn check_self_demotion(admin: &CurrentStaff, target: UserId, role: UserRole) -> Result<()> {
    if admin.id == target && role != UserRole::Admin {
        return Err(AppError::BadRequest(
            "You cannot remove your own admin role".to_string(),
        ));
    }
    Ok(())
}

/// Users with filters, newest first.
///
/// GET /api/admin/users
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<UserSummary>>> {
    let (filter, page) = query.into_parts();
    Ok(Json(UserRepository::new(state.pool()).list(&filter, page).await?))
}

/// Change a user's role.
///
/// PUT /api/admin/users/{id}/role
#[tracing::instrument(skip(state, admin, form), fields(admin_id = %admin.id, role = %form.role))]
pub async fn set_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
    Json(form): Json<RoleRequest>,
) -> Result<Json<UserSummary>> {
    check_self_demotion(&admin, id, form.role)?;

    let user = UserRepository::new(state.pool())
        .set_role(id, form.role)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("User not found".to_string()),
            other => other.into(),
        })?;

    let user_id = id.to_string();
    add_breadcrumb(
        "user",
        "role changed",
        Some(&[("user_id", user_id.as_str()), ("role", form.role.as_str())]),
    );
    tracing::info!(user_id = %id, role = %form.role, "user role changed");
    Ok(Json(user))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use luxora_core::Email;

    use super::*;

    fn admin() -> CurrentStaff {
        CurrentStaff {
            id: UserId::new(1),
            email: Email::parse("admin@luxora.test").unwrap(),
            name: "Admin".to_string(),
            role: UserRole::Admin,
            merchant_id: None,
        }
    }

    #[test]
    fn test_admin_cannot_demote_self() {
        let err = check_self_demotion(&admin(), UserId::new(1), UserRole::Customer).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(check_self_demotion(&admin(), UserId::new(1), UserRole::Admin).is_ok());
    }

    #[test]
    fn test_admin_can_change_others() {
        assert!(check_self_demotion(&admin(), UserId::new(2), UserRole::Customer).is_ok());
        assert!(check_self_demotion(&admin(), UserId::new(2), UserRole::Merchant).is_ok());
    }

    #[test]
    fn test_role_request_parses() {
        let form: RoleRequest = serde_json::from_str(r#"{"role":"MERCHANT"}"#).unwrap();
        assert_eq!(form.role, UserRole::Merchant);
    }
}
