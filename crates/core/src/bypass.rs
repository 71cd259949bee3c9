//! Bypass link issuance

use std::sync::Arc;

use lockgate_shared::AccountId;

use crate::error::{GateError, GateResult};
use crate::query;
use crate::store::StatusStore;
use crate::token::TokenGenerator;

/// Builds one-time-shareable bypass URLs for an account, whitelisting
/// the destination as a side effect.
pub struct BypassLinkIssuer {
    store: Arc<dyn StatusStore>,
    tokens: TokenGenerator,
}

impl BypassLinkIssuer {
    pub fn new(store: Arc<dyn StatusStore>, tokens: TokenGenerator) -> Self {
        Self { store, tokens }
    }

    /// Build a bypass URL for `destination`.
    ///
    /// Ensures the account holds an access token (generating and
    /// persisting one if absent) and that `destination` is on its
    /// personal whitelist (appending without duplication). Repeated
    /// calls with the same destination return the same URL.
    pub async fn issue_link(&self, id: AccountId, destination: &str) -> GateResult<String> {
        if !self.store.account_exists(id).await? {
            return Err(GateError::InvalidAccount(id));
        }

        let token = match self.store.access_token(id).await? {
            Some(token) if !token.is_empty() => token,
            _ => {
                let token = self.tokens.generate();
                self.store.set_access_token(id, &token).await?;
                tracing::info!(account_id = %id, "access token provisioned for bypass link");
                token
            }
        };

        if self.store.append_whitelist_entry(id, destination).await? {
            tracing::debug!(account_id = %id, destination, "destination whitelisted");
        }

        Ok(query::append_bypass_params(destination, id, &token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStatusStore, StatusStore};
    use lockgate_shared::AccountStatus;

    fn issuer(store: Arc<MemoryStatusStore>) -> BypassLinkIssuer {
        BypassLinkIssuer::new(store, TokenGenerator::new())
    }

    #[tokio::test]
    async fn unknown_account_is_an_error() {
        let store = Arc::new(MemoryStatusStore::new());
        let err = issuer(store).issue_link(AccountId(1), "/r").await.unwrap_err();
        assert!(matches!(err, GateError::InvalidAccount(AccountId(1))));
    }

    // Scenario D: tokenless account gets a token, the destination gets
    // whitelisted, and the URL carries both parameters.
    #[tokio::test]
    async fn issuing_provisions_token_and_whitelist_entry() {
        let store = Arc::new(MemoryStatusStore::new());
        store.add_account(AccountId(42), AccountStatus::Locked).await;

        let url = issuer(store.clone())
            .issue_link(AccountId(42), "/reports")
            .await
            .unwrap();

        let token = store.access_token(AccountId(42)).await.unwrap().unwrap();
        assert!(!token.is_empty());
        assert_eq!(
            store.personal_whitelist(AccountId(42)).await.unwrap(),
            vec!["/reports".to_string()]
        );
        assert_eq!(
            url,
            format!("/reports?access_account=42&access_token={token}")
        );
    }

    #[tokio::test]
    async fn existing_token_is_reused() {
        let store = Arc::new(MemoryStatusStore::new());
        store.add_account(AccountId(1), AccountStatus::Locked).await;
        store.set_access_token(AccountId(1), "keepme").await.unwrap();

        let url = issuer(store.clone()).issue_link(AccountId(1), "/d").await.unwrap();
        assert!(url.contains("access_token=keepme"));
        assert_eq!(
            store.access_token(AccountId(1)).await.unwrap().as_deref(),
            Some("keepme")
        );
    }

    #[tokio::test]
    async fn issuing_twice_is_idempotent() {
        let store = Arc::new(MemoryStatusStore::new());
        store.add_account(AccountId(1), AccountStatus::Locked).await;
        let issuer = issuer(store.clone());

        let first = issuer.issue_link(AccountId(1), "/d").await.unwrap();
        let second = issuer.issue_link(AccountId(1), "/d").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            store.personal_whitelist(AccountId(1)).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn new_destinations_grow_the_whitelist_in_order() {
        let store = Arc::new(MemoryStatusStore::new());
        store.add_account(AccountId(1), AccountStatus::Locked).await;
        store
            .set_personal_whitelist(AccountId(1), vec!["/existing".to_string()])
            .await
            .unwrap();
        let issuer = issuer(store.clone());

        issuer.issue_link(AccountId(1), "/a").await.unwrap();
        issuer.issue_link(AccountId(1), "/b").await.unwrap();

        assert_eq!(
            store.personal_whitelist(AccountId(1)).await.unwrap(),
            vec!["/existing".to_string(), "/a".to_string(), "/b".to_string()]
        );
    }
}
