//! In-memory status store.
//!
//! Reference implementation of the [`StatusStore`] contract. Suitable
//! for tests and small embedded deployments; per-account writes are
//! serialized through a single lock, so concurrent whitelist appends
//! cannot lose entries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::RwLock;

use lockgate_shared::{Account, AccountId, AccountStatus, StatusChangeEvent, StoreError};

use super::{token_matches, StatusChangeListener, StatusStore};

const DEFAULT_AUTH_MESSAGE: &str =
    "Your account is not permitted to sign in. Contact an administrator.";

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<AccountId, Account>,
    global_whitelist: Vec<String>,
    locked_redirect_url: String,
    disabled_redirect_url: String,
    authentication_message: String,
}

/// In-memory [`StatusStore`].
pub struct MemoryStatusStore {
    inner: RwLock<Inner>,
    listeners: Mutex<Vec<Arc<dyn StatusChangeListener>>>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                accounts: HashMap::new(),
                global_whitelist: Vec::new(),
                locked_redirect_url: "/locked".to_string(),
                disabled_redirect_url: "/disabled".to_string(),
                authentication_message: DEFAULT_AUTH_MESSAGE.to_string(),
            }),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Insert (or replace) an account.
    pub async fn insert_account(&self, account: Account) {
        let mut inner = self.inner.write().await;
        inner.accounts.insert(account.id, account);
    }

    /// Insert a bare account with the given status and no token or
    /// whitelist entries.
    pub async fn add_account(&self, id: AccountId, status: AccountStatus) {
        self.insert_account(Account {
            id,
            status,
            access_token: None,
            whitelist: Vec::new(),
        })
        .await;
    }

    pub async fn set_global_whitelist(&self, patterns: Vec<String>) {
        self.inner.write().await.global_whitelist = patterns;
    }

    pub async fn set_locked_redirect_url(&self, url: impl Into<String>) {
        self.inner.write().await.locked_redirect_url = url.into();
    }

    pub async fn set_disabled_redirect_url(&self, url: impl Into<String>) {
        self.inner.write().await.disabled_redirect_url = url.into();
    }

    pub async fn set_authentication_message(&self, message: impl Into<String>) {
        self.inner.write().await.authentication_message = message.into();
    }

    fn listeners_snapshot(&self) -> Vec<Arc<dyn StatusChangeListener>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn account_exists(&self, id: AccountId) -> Result<bool, StoreError> {
        Ok(self.inner.read().await.accounts.contains_key(&id))
    }

    async fn status(&self, id: AccountId) -> Result<AccountStatus, StoreError> {
        let inner = self.inner.read().await;
        inner
            .accounts
            .get(&id)
            .map(|a| a.status)
            .ok_or(StoreError::AccountNotFound(id))
    }

    async fn set_status(&self, id: AccountId, status: AccountStatus) -> Result<(), StoreError> {
        let event = {
            let mut inner = self.inner.write().await;
            let account = inner
                .accounts
                .get_mut(&id)
                .ok_or(StoreError::AccountNotFound(id))?;
            let old = account.status;
            account.status = status;
            StatusChangeEvent {
                account_id: id,
                old,
                new: status,
            }
        };

        for listener in self.listeners_snapshot() {
            listener.on_status_change(&event).await?;
        }
        Ok(())
    }

    async fn access_token(&self, id: AccountId) -> Result<Option<String>, StoreError> {
        let inner = self.inner.read().await;
        inner
            .accounts
            .get(&id)
            .map(|a| a.access_token.clone())
            .ok_or(StoreError::AccountNotFound(id))
    }

    async fn set_access_token(&self, id: AccountId, token: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let account = inner
            .accounts
            .get_mut(&id)
            .ok_or(StoreError::AccountNotFound(id))?;
        account.access_token = Some(token.to_string());
        Ok(())
    }

    async fn personal_whitelist(&self, id: AccountId) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().await;
        inner
            .accounts
            .get(&id)
            .map(|a| a.whitelist.clone())
            .ok_or(StoreError::AccountNotFound(id))
    }

    async fn set_personal_whitelist(
        &self,
        id: AccountId,
        patterns: Vec<String>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let account = inner
            .accounts
            .get_mut(&id)
            .ok_or(StoreError::AccountNotFound(id))?;
        account.whitelist = patterns;
        Ok(())
    }

    async fn append_whitelist_entry(&self, id: AccountId, url: &str) -> Result<bool, StoreError> {
        // Single write lock makes the read-modify-write atomic per store.
        let mut inner = self.inner.write().await;
        let account = inner
            .accounts
            .get_mut(&id)
            .ok_or(StoreError::AccountNotFound(id))?;
        if account.whitelist.iter().any(|entry| entry == url) {
            return Ok(false);
        }
        account.whitelist.push(url.to_string());
        Ok(true)
    }

    async fn global_whitelist(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.inner.read().await.global_whitelist.clone())
    }

    async fn locked_redirect_url(&self) -> Result<String, StoreError> {
        Ok(self.inner.read().await.locked_redirect_url.clone())
    }

    async fn disabled_redirect_url(&self) -> Result<String, StoreError> {
        Ok(self.inner.read().await.disabled_redirect_url.clone())
    }

    async fn authentication_message(&self) -> Result<String, StoreError> {
        Ok(self.inner.read().await.authentication_message.clone())
    }

    async fn find_account_by_token(
        &self,
        id: AccountId,
        token: &str,
    ) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.get(&id).and_then(|account| {
            let stored = account.access_token.as_deref().unwrap_or("");
            token_matches(stored, token).then(|| account.clone())
        }))
    }

    fn register_listener(&self, listener: Arc<dyn StatusChangeListener>) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }
}
