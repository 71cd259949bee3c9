//! Status store contract
//!
//! Persistence of status, token, and whitelist values is an external
//! collaborator; the core only ever talks to it through [`StatusStore`].
//! Implementations must be thread-safe (`Send + Sync`) as they are
//! called concurrently from independent requests.

mod memory;

pub use memory::MemoryStatusStore;

use std::sync::Arc;

use async_trait::async_trait;
use subtle::ConstantTimeEq;

use lockgate_shared::{Account, AccountId, AccountStatus, StatusChangeEvent, StoreError};

/// Observer of status mutations, registered on a store at startup.
///
/// [`StatusStore::set_status`] must notify every registered listener
/// synchronously, after persisting, before returning. This is how the
/// bypass path is guaranteed a non-empty token to compare against: the
/// [`crate::AuthGate`] listener provisions one on every transition into
/// `Locked`.
#[async_trait]
pub trait StatusChangeListener: Send + Sync {
    async fn on_status_change(&self, event: &StatusChangeEvent) -> Result<(), StoreError>;
}

/// Abstract read/write of per-account status, token, and whitelist
/// entries, plus process-wide gate configuration.
///
/// Reads are potentially blocking I/O and must complete before a
/// decision is returned; the core never caches across requests, since
/// status and token freshness affects security. Any read failure
/// propagates unchanged (fail closed: an unreadable status is never
/// treated as `Normal`).
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn account_exists(&self, id: AccountId) -> Result<bool, StoreError>;

    /// Status of an account; `StoreError::AccountNotFound` for unknown
    /// accounts rather than a default.
    async fn status(&self, id: AccountId) -> Result<AccountStatus, StoreError>;

    /// Persist a new status, then synchronously notify registered
    /// listeners with `(id, old, new)`.
    async fn set_status(&self, id: AccountId, status: AccountStatus) -> Result<(), StoreError>;

    async fn access_token(&self, id: AccountId) -> Result<Option<String>, StoreError>;

    async fn set_access_token(&self, id: AccountId, token: &str) -> Result<(), StoreError>;

    /// Ordered personal whitelist for an account.
    async fn personal_whitelist(&self, id: AccountId) -> Result<Vec<String>, StoreError>;

    async fn set_personal_whitelist(
        &self,
        id: AccountId,
        patterns: Vec<String>,
    ) -> Result<(), StoreError>;

    /// Append `url` to the personal whitelist iff not already present
    /// (exact string membership), preserving order. Must be atomic per
    /// account: concurrent appends for the same account may not lose an
    /// entry. Returns whether an entry was appended.
    async fn append_whitelist_entry(&self, id: AccountId, url: &str) -> Result<bool, StoreError>;

    async fn global_whitelist(&self) -> Result<Vec<String>, StoreError>;

    async fn locked_redirect_url(&self) -> Result<String, StoreError>;

    async fn disabled_redirect_url(&self) -> Result<String, StoreError>;

    /// Human-readable message shown when a login is rejected for a
    /// non-Normal status. Deliberately status-agnostic.
    async fn authentication_message(&self) -> Result<String, StoreError>;

    /// The account iff it exists and `token` matches its stored access
    /// token; cross-account tokens never match, and an empty stored or
    /// supplied token never matches anything.
    async fn find_account_by_token(
        &self,
        id: AccountId,
        token: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// Register a status-change listener. Intended for process startup,
    /// before the store starts serving requests.
    fn register_listener(&self, listener: Arc<dyn StatusChangeListener>);
}

/// Constant-time access-token comparison to prevent timing attacks.
/// Empty tokens never match: an account that was never locked must not
/// be bypassable with an empty credential.
pub fn token_matches(stored: &str, supplied: &str) -> bool {
    if stored.is_empty() || supplied.is_empty() {
        return false;
    }
    if stored.len() != supplied.len() {
        // Dummy comparison to avoid length-based timing leaks
        let dummy = vec![0u8; supplied.len()];
        let _ = supplied.as_bytes().ct_eq(&dummy);
        return false;
    }
    stored.as_bytes().ct_eq(supplied.as_bytes()).into()
}
