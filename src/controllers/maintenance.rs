use axum::{extract::State, http::StatusCode};
use secrecy::{ExposeSecret, SecretString};

use crate::{auth::error::AuthError, error::Error, state::SharedAppState};

#[derive(serde::Deserialize)]
pub struct AdminQuery {
    pub admin_key: SecretString,
}

/// Drops every cached movie list. Used after maintenance writes that bypass
/// the per-operation patches.
#[tracing::instrument(name = "[POST] maintenance/flush-cache", skip_all)]
pub async fn flush_cache(
    State(app_state): State<SharedAppState>,
    axum::extract::Query(query): axum::extract::Query<AdminQuery>,
) -> Result<StatusCode, Error> {
    if query.admin_key.expose_secret() != app_state.config.application.admin_key.expose_secret() {
        return Err(Error::Auth(AuthError::Unauthenticated));
    }

    app_state.cache.flush_all();
    tracing::info!("movie list cache flushed");

    Ok(StatusCode::OK)
}
