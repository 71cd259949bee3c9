//! Admin endpoints: status changes and bypass-link issuance
//!
//! These sit behind the gate middleware like everything else and
//! additionally require an established session. Finer-grained admin
//! authorization belongs to the host deployment (reverse proxy, network
//! policy); these endpoints only enforce the session requirement.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use lockgate_core::StatusStore;
use lockgate_shared::{AccountId, AccountStatus};

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentAccount;
use crate::state::AppState;

fn require_session(account: Option<Extension<CurrentAccount>>) -> ApiResult<AccountId> {
    account
        .map(|Extension(CurrentAccount(id))| id)
        .ok_or(ApiError::Unauthorized)
}

/// Site-relative links get the public base URL prefixed so the issued
/// link is shareable as-is. Absolute destinations pass through.
fn absolutize(public_url: &str, link: &str) -> String {
    if link.starts_with('/') {
        format!("{}{}", public_url.trim_end_matches('/'), link)
    } else {
        link.to_string()
    }
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: AccountStatus,
}

/// Set an account's status. Fires the status-change listeners, so
/// locking an account provisions its bypass token as a side effect.
pub async fn set_status(
    State(state): State<AppState>,
    account: Option<Extension<CurrentAccount>>,
    Path(id): Path<i64>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<StatusCode> {
    let admin = require_session(account)?;
    state.store.set_status(AccountId(id), req.status).await?;
    tracing::info!(admin = %admin, account_id = id, status = %req.status, "status set");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct BypassLinkRequest {
    pub destination: String,
}

#[derive(Debug, Serialize)]
pub struct BypassLinkResponse {
    pub url: String,
}

/// Issue a bypass link for an account, whitelisting the destination.
pub async fn issue_bypass_link(
    State(state): State<AppState>,
    account: Option<Extension<CurrentAccount>>,
    Path(id): Path<i64>,
    Json(req): Json<BypassLinkRequest>,
) -> ApiResult<Json<BypassLinkResponse>> {
    let admin = require_session(account)?;
    if req.destination.is_empty() {
        return Err(ApiError::BadRequest("destination must not be empty".to_string()));
    }

    let link = state.issuer.issue_link(AccountId(id), &req.destination).await?;
    let url = absolutize(&state.config.public_url, &link);
    // The URL embeds the token; log the destination only.
    tracing::info!(admin = %admin, account_id = id, destination = %req.destination, "bypass link issued");
    Ok(Json(BypassLinkResponse { url }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_links_get_the_public_base() {
        assert_eq!(
            absolutize("https://gate.example.com", "/r?access_token=t"),
            "https://gate.example.com/r?access_token=t"
        );
        // A trailing slash on the base must not double up.
        assert_eq!(
            absolutize("https://gate.example.com/", "/r"),
            "https://gate.example.com/r"
        );
    }

    #[test]
    fn absolute_links_pass_through() {
        assert_eq!(
            absolutize("https://gate.example.com", "https://other.example.com/r"),
            "https://other.example.com/r"
        );
    }
}
