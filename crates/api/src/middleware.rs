//! Per-request gate middleware
//!
//! Runs the access-decision engine on every routed request, before the
//! handler. The engine sees the raw path+query (bypass credentials live
//! there) and drives the JWT cookie session; whatever it decides, the
//! pending session mutation is applied to the outgoing response so
//! bypass logins and forced logouts stick.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use lockgate_core::{Decision, Session};
use lockgate_shared::AccountId;

use crate::auth::CookieSession;
use crate::error::ApiError;
use crate::state::AppState;

/// Account established for the request, injected as an extension when
/// the gate allows it through.
#[derive(Debug, Clone, Copy)]
pub struct CurrentAccount(pub AccountId);

pub async fn check_access(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let url = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let mut session = CookieSession::from_request(&state.jwt, req.headers());

    match state.engine.evaluate(&url, &mut session).await {
        Ok(Decision::Allow) => {
            if let Some(account_id) = session.current_account() {
                req.extensions_mut().insert(CurrentAccount(account_id));
            }
            let mut response = next.run(req).await;
            apply_session(&state, &session, &mut response);
            response
        }
        Ok(Decision::Redirect(target)) => {
            tracing::debug!(from = %url, to = %target, "gate redirect");
            let mut response = Redirect::to(&target).into_response();
            apply_session(&state, &session, &mut response);
            response
        }
        Err(e) => {
            // Fail closed: a decision we cannot compute is an error
            // response, never a pass-through.
            tracing::error!(error = %e, url = %url, "access evaluation failed");
            ApiError::from(e).into_response()
        }
    }
}

fn apply_session(state: &AppState, session: &CookieSession, response: &mut Response) {
    if let Err(e) = session.apply_to(&state.jwt, response.headers_mut()) {
        tracing::error!(error = %e, "failed to apply session cookie");
        *response = ApiError::Internal.into_response();
    }
}
