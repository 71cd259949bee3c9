//! Login, logout, and password-reset endpoints
//!
//! Credential verification is ordinary password auth; the lockgate twist
//! is the second enforcement point after it: a correct password for a
//! locked or disabled account is still a rejected login.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use lockgate_core::StatusStore;
use lockgate_shared::AccountId;

use crate::auth::{password, session};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub account_id: AccountId,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Response> {
    let row: Option<(i64, String)> =
        sqlx::query_as("SELECT id, password_hash FROM accounts WHERE name = $1")
            .bind(&req.name)
            .fetch_optional(&state.pool)
            .await?;

    let Some((account_id, password_hash)) = row else {
        // Burn comparable time so unknown names aren't distinguishable
        // from wrong passwords.
        let _ = password::hash_password(&req.password);
        tracing::warn!(name = %req.name, "login: account not found");
        return Err(ApiError::InvalidCredentials);
    };

    let valid = password::verify_password(&req.password, &password_hash).map_err(|e| {
        tracing::error!(error = %e, "login: password verification errored");
        ApiError::Internal
    })?;
    if !valid {
        tracing::warn!(account_id, "login: invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    // Second enforcement point: the credential is correct, but the
    // status gate decides whether a session may exist at all.
    state.gate.authenticate(AccountId(account_id)).await?;

    let token = state.jwt.generate_token(account_id)?;
    let max_age = state.jwt.expiry_hours() * 3600;
    let cookie = format!(
        "{}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
        session::SESSION_COOKIE
    );

    tracing::info!(account_id, "login succeeded");
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            account_id: AccountId(account_id),
        }),
    )
        .into_response())
}

pub async fn logout() -> Response {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, session::clear_cookie())],
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub name: String,
}

pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> ApiResult<StatusCode> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM accounts WHERE name = $1")
        .bind(&req.name)
        .fetch_optional(&state.pool)
        .await?;

    // Unknown names get the same accepted response as known ones; the
    // endpoint must not be an account oracle.
    let Some((account_id,)) = row else {
        return Ok(StatusCode::ACCEPTED);
    };

    let allowed = state
        .gate
        .allow_password_reset(true, AccountId(account_id))
        .await?;
    if !allowed {
        tracing::info!(account_id, "password reset denied by status gate");
        let message = state.store.authentication_message().await?;
        return Err(ApiError::Forbidden(message));
    }

    // Reset-mail delivery is the host application's concern; the gate's
    // job ends at allowing the initiation.
    tracing::info!(account_id, "password reset initiated");
    Ok(StatusCode::ACCEPTED)
}
