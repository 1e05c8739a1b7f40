//! Authentication routes: registration, login, logout and session lookup.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use validator::Validate;

use crate::db::UserRepository;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::extract::ValidatedJson;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::AuthService;
use crate::state::AppState;

/// Sign-up form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub password: String,
}

/// Login form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &CurrentUser::from(user))
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// Create a customer account and sign it in.
///
/// POST /api/auth/register
#[tracing::instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    ValidatedJson(form): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = AuthService::new(state.pool())
        .register(&form.email, &form.name, &form.password)
        .await?;
    start_session(&session, &user).await?;

    tracing::info!(user_id = %user.id, "customer registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Password login.
///
/// POST /api/auth/login
#[tracing::instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ValidatedJson(form): ValidatedJson<LoginRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
        .inspect_err(|_| tracing::warn!("failed login attempt"))?;
    start_session(&session, &user).await?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(user))
}

/// End the session.
///
/// POST /api/auth/logout
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The signed-in user.
///
/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Json<User>> {
    if let Some(user) = UserRepository::new(state.pool()).get_by_id(current.id).await? {
        return Ok(Json(user));
    }

    // Account removed while signed in
    let _ = clear_current_user(&session).await;
    Err(AppError::Unauthorized("Authentication required".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let ok = RegisterRequest {
            email: "ines@example.com".to_string(),
            name: "Ines".to_string(),
            password: "long enough".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = RegisterRequest {
            email: "not-an-email".to_string(),
            name: String::new(),
            password: "x".to_string(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("name"));
    }
}
