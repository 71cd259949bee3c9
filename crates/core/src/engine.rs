//! Access decision engine
//!
//! One evaluation per incoming request: bypass check, anonymous
//! passthrough, then status evaluation. The engine holds only injected
//! collaborators and no per-request state.

use std::sync::Arc;

use lockgate_shared::{AccountId, AccountStatus};

use crate::error::GateResult;
use crate::query;
use crate::session::Session;
use crate::store::StatusStore;
use crate::whitelist;

/// Outcome of one evaluation. A redirect terminates request processing;
/// it is not retried or recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(String),
}

/// Central state machine: given an account's status and optionally a
/// bypass credential, decide allow / redirect / issue-session.
pub struct AccessDecisionEngine {
    store: Arc<dyn StatusStore>,
}

impl AccessDecisionEngine {
    pub fn new(store: Arc<dyn StatusStore>) -> Self {
        Self { store }
    }

    /// Evaluate one request.
    ///
    /// `url` is the requested URL (path plus query); `session` is the
    /// host's per-request session state, which the bypass path mutates.
    pub async fn evaluate(&self, url: &str, session: &mut dyn Session) -> GateResult<Decision> {
        let mut url = url.to_string();

        if let Some(credential) = query::bypass_credential(&url) {
            // Any existing session goes away before the credential is
            // even examined.
            if session.current_account().is_some() {
                session.terminate();
            }

            let account = match credential.account.parse::<i64>() {
                Ok(id) => {
                    self.store
                        .find_account_by_token(AccountId(id), &credential.token)
                        .await?
                }
                // Non-numeric account value: same as no match
                Err(_) => None,
            };

            let Some(account) = account else {
                // Invalid credential behaves exactly like a disabled
                // account, against the unstripped URL.
                tracing::warn!(url = %url, "bypass credential rejected");
                return self.redirect_disabled(&url).await;
            };

            tracing::info!(account_id = %account.id, "bypass credential accepted");
            session.establish(account.id);

            // Strip the credential so the whitelists see the bare URL.
            url = query::strip_bypass_params(&url);
        }

        let Some(account_id) = session.current_account() else {
            // No credential and no session: there is no identity to
            // evaluate a status for.
            return Ok(Decision::Allow);
        };

        match self.store.status(account_id).await? {
            AccountStatus::Normal => Ok(Decision::Allow),
            AccountStatus::Locked => {
                let global = self.store.global_whitelist().await?;
                let personal = self.store.personal_whitelist(account_id).await?;
                if whitelist::is_whitelisted(&url, &global, &personal) {
                    Ok(Decision::Allow)
                } else {
                    tracing::debug!(account_id = %account_id, url = %url, "locked account blocked");
                    let target = self.store.locked_redirect_url().await?;
                    Ok(redirect_or_allow(&url, target))
                }
            }
            // Whitelisting never overrides Disabled.
            AccountStatus::Disabled => {
                tracing::debug!(account_id = %account_id, url = %url, "disabled account blocked");
                self.redirect_disabled(&url).await
            }
        }
    }

    async fn redirect_disabled(&self, url: &str) -> GateResult<Decision> {
        let target = self.store.disabled_redirect_url().await?;
        Ok(redirect_or_allow(url, target))
    }
}

/// Redirect to `target` unless the request is already there, which would
/// loop forever.
fn redirect_or_allow(current_url: &str, target: String) -> Decision {
    if current_url == target {
        Decision::Allow
    } else {
        Decision::Redirect(target)
    }
}
