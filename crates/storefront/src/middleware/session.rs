//! Shopper sessions.
//!
//! Sessions live in `tower_sessions.session`, which the dashboards share
//! under their own cookie. The storefront purges expired rows for both.

use std::time::Duration;

use sqlx::PgPool;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration as CookieDuration;
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "luxora_session";

/// Shoppers stay signed in through 7 days of inactivity.
const SESSION_IDLE: CookieDuration = CookieDuration::days(7);

/// Pause between expired-session purges.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Create the session layer over the `PostgreSQL` store.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    SessionManagerLayer::new(PostgresStore::new(pool.clone()))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(SESSION_IDLE))
        .with_same_site(SameSite::Lax)
        .with_secure(config.is_secure())
        .with_http_only(true)
}

/// Purge expired sessions in the background, once an hour.
pub fn spawn_session_cleanup(pool: &PgPool) {
    let store = PostgresStore::new(pool.clone());
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(e) = store.delete_expired().await {
                tracing::warn!(error = %e, "expired session purge failed");
            }
        }
    });
}
