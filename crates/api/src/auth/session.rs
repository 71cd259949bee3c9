//! JWT cookie sessions
//!
//! Maps the core `Session` contract onto an HttpOnly cookie. The gate
//! middleware builds a `CookieSession` from the request, hands it to the
//! decision engine, and applies whatever the engine did to the outgoing
//! response (including redirect responses).

use axum::http::{header, HeaderMap, HeaderValue};

use lockgate_core::Session;
use lockgate_shared::AccountId;

use super::jwt::JwtManager;
use crate::error::ApiError;

/// Session cookie name
pub const SESSION_COOKIE: &str = "lockgate_session";

/// Pending mutation recorded by the engine during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionOp {
    Unchanged,
    Establish(AccountId),
    Terminate,
}

/// Per-request session state backed by the JWT cookie.
#[derive(Debug)]
pub struct CookieSession {
    current: Option<AccountId>,
    op: SessionOp,
}

impl CookieSession {
    /// Build from the request's Cookie header. An absent, expired, or
    /// otherwise invalid token is simply an anonymous session.
    pub fn from_request(jwt: &JwtManager, headers: &HeaderMap) -> Self {
        let current = cookie_value(headers, SESSION_COOKIE)
            .and_then(|token| jwt.validate_token(&token).ok())
            .map(|claims| AccountId(claims.sub));
        Self {
            current,
            op: SessionOp::Unchanged,
        }
    }

    /// Write the pending mutation to the response headers. An untouched
    /// session writes nothing.
    pub fn apply_to(&self, jwt: &JwtManager, headers: &mut HeaderMap) -> Result<(), ApiError> {
        let cookie = match self.op {
            SessionOp::Unchanged => return Ok(()),
            SessionOp::Establish(account_id) => {
                let token = jwt.generate_token(account_id.0)?;
                let max_age = jwt.expiry_hours() * 3600;
                format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}")
            }
            SessionOp::Terminate => clear_cookie(),
        };
        headers.append(
            header::SET_COOKIE,
            HeaderValue::from_str(&cookie).map_err(|_| ApiError::Internal)?,
        );
        Ok(())
    }
}

impl Session for CookieSession {
    fn current_account(&self) -> Option<AccountId> {
        self.current
    }

    fn establish(&mut self, account_id: AccountId) {
        self.current = Some(account_id);
        self.op = SessionOp::Establish(account_id);
    }

    fn terminate(&mut self) {
        self.current = None;
        self.op = SessionOp::Terminate;
    }
}

/// Expired cookie that clears the session on the client.
pub fn clear_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}
