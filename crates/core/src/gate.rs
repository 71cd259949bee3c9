//! Login and password-reset gating
//!
//! Status is enforced both at session establishment (here) and at every
//! page view ([`crate::AccessDecisionEngine`]): a session could be
//! established through a path that never passes the per-URL check.

use async_trait::async_trait;

use std::sync::Arc;

use lockgate_shared::{AccountId, AccountStatus, StatusChangeEvent, StoreError};

use crate::error::{GateError, GateResult};
use crate::store::{StatusChangeListener, StatusStore};
use crate::token::TokenGenerator;

/// Enforcement points invoked by the host on login and password-reset
/// attempts, plus the status-change hook that keeps locked accounts
/// supplied with bypass tokens.
pub struct AuthGate {
    store: Arc<dyn StatusStore>,
    tokens: TokenGenerator,
}

impl AuthGate {
    pub fn new(store: Arc<dyn StatusStore>, tokens: TokenGenerator) -> Self {
        Self { store, tokens }
    }

    /// Called after credential verification succeeds, before the session
    /// is finalized. Rejects any non-Normal account with the configured
    /// message, which never says whether the account is locked or
    /// disabled.
    pub async fn authenticate(&self, id: AccountId) -> GateResult<()> {
        if self.store.status(id).await? != AccountStatus::Normal {
            tracing::info!(account_id = %id, "login rejected for non-normal status");
            let message = self.store.authentication_message().await?;
            return Err(GateError::LoginRejected(message));
        }
        Ok(())
    }

    /// Host password-reset filter: forces `false` for any non-Normal
    /// account, otherwise passes the incoming decision through.
    pub async fn allow_password_reset(&self, allow: bool, id: AccountId) -> GateResult<bool> {
        if self.store.status(id).await? != AccountStatus::Normal {
            return Ok(false);
        }
        Ok(allow)
    }
}

#[async_trait]
impl StatusChangeListener for AuthGate {
    /// Every account entering `Locked` must end up with a non-empty
    /// access token; assignment is lazy, on the first transition only.
    async fn on_status_change(&self, event: &StatusChangeEvent) -> Result<(), StoreError> {
        if event.new != AccountStatus::Locked {
            return Ok(());
        }

        let has_token = matches!(
            self.store.access_token(event.account_id).await?,
            Some(token) if !token.is_empty()
        );
        if !has_token {
            let token = self.tokens.generate();
            self.store.set_access_token(event.account_id, &token).await?;
            tracing::info!(account_id = %event.account_id, "access token assigned on lock");
        }
        Ok(())
    }
}
