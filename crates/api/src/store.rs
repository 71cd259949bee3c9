//! Postgres-backed status store
//!
//! Whitelists are stored the way the admin UI edits them: one CRLF-
//! delimited text blob per account (and one in `gate_settings` for the
//! global list). Splitting and joining happens here; empty lines are
//! the matcher's problem, which skips them.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use sqlx::PgPool;

use lockgate_core::{token_matches, StatusChangeListener, StatusStore};
use lockgate_shared::{Account, AccountId, AccountStatus, StatusChangeEvent, StoreError};

const WHITELIST_DELIMITER: &str = "\r\n";

fn split_whitelist(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(WHITELIST_DELIMITER).map(str::to_string).collect()
}

fn join_whitelist(patterns: &[String]) -> String {
    patterns.join(WHITELIST_DELIMITER)
}

pub struct PgStatusStore {
    pool: PgPool,
    listeners: Mutex<Vec<Arc<dyn StatusChangeListener>>>,
}

impl PgStatusStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            listeners: Mutex::new(Vec::new()),
        }
    }

    async fn setting(&self, key: &str) -> Result<String, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM gate_settings WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|(value,)| value)
            .ok_or_else(|| StoreError::Internal(format!("missing gate setting: {key}")))
    }

    fn listeners_snapshot(&self) -> Vec<Arc<dyn StatusChangeListener>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl StatusStore for PgStatusStore {
    async fn account_exists(&self, id: AccountId) -> Result<bool, StoreError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)")
                .bind(id.0)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn status(&self, id: AccountId) -> Result<AccountStatus, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT status FROM accounts WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        let (status,) = row.ok_or(StoreError::AccountNotFound(id))?;
        AccountStatus::parse(&status)
    }

    async fn set_status(&self, id: AccountId, status: AccountStatus) -> Result<(), StoreError> {
        // Row lock so concurrent status writes serialize and every
        // listener sees a correct (old, new) pair.
        let mut tx = self.pool.begin().await?;
        let row: Option<(String,)> =
            sqlx::query_as("SELECT status FROM accounts WHERE id = $1 FOR UPDATE")
                .bind(id.0)
                .fetch_optional(&mut *tx)
                .await?;
        let (old,) = row.ok_or(StoreError::AccountNotFound(id))?;
        let old = AccountStatus::parse(&old)?;

        sqlx::query("UPDATE accounts SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id.0)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(account_id = %id, old = %old, new = %status, "account status changed");

        let event = StatusChangeEvent {
            account_id: id,
            old,
            new: status,
        };
        for listener in self.listeners_snapshot() {
            listener.on_status_change(&event).await?;
        }
        Ok(())
    }

    async fn access_token(&self, id: AccountId) -> Result<Option<String>, StoreError> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT access_token FROM accounts WHERE id = $1")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;
        let (token,) = row.ok_or(StoreError::AccountNotFound(id))?;
        Ok(token)
    }

    async fn set_access_token(&self, id: AccountId, token: &str) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE accounts SET access_token = $1, updated_at = NOW() WHERE id = $2")
                .bind(token)
                .bind(id.0)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::AccountNotFound(id));
        }
        Ok(())
    }

    async fn personal_whitelist(&self, id: AccountId) -> Result<Vec<String>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT whitelist FROM accounts WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        let (raw,) = row.ok_or(StoreError::AccountNotFound(id))?;
        Ok(split_whitelist(&raw))
    }

    async fn set_personal_whitelist(
        &self,
        id: AccountId,
        patterns: Vec<String>,
    ) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE accounts SET whitelist = $1, updated_at = NOW() WHERE id = $2")
                .bind(join_whitelist(&patterns))
                .bind(id.0)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::AccountNotFound(id));
        }
        Ok(())
    }

    async fn append_whitelist_entry(&self, id: AccountId, url: &str) -> Result<bool, StoreError> {
        // Read-modify-write under a row lock so concurrent appends for
        // the same account cannot lose entries.
        let mut tx = self.pool.begin().await?;
        let row: Option<(String,)> =
            sqlx::query_as("SELECT whitelist FROM accounts WHERE id = $1 FOR UPDATE")
                .bind(id.0)
                .fetch_optional(&mut *tx)
                .await?;
        let (raw,) = row.ok_or(StoreError::AccountNotFound(id))?;

        let mut patterns = split_whitelist(&raw);
        if patterns.iter().any(|entry| entry == url) {
            tx.rollback().await?;
            return Ok(false);
        }
        patterns.push(url.to_string());

        sqlx::query("UPDATE accounts SET whitelist = $1, updated_at = NOW() WHERE id = $2")
            .bind(join_whitelist(&patterns))
            .bind(id.0)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn global_whitelist(&self) -> Result<Vec<String>, StoreError> {
        Ok(split_whitelist(&self.setting("global_whitelist").await?))
    }

    async fn locked_redirect_url(&self) -> Result<String, StoreError> {
        self.setting("locked_redirect_url").await
    }

    async fn disabled_redirect_url(&self) -> Result<String, StoreError> {
        self.setting("disabled_redirect_url").await
    }

    async fn authentication_message(&self) -> Result<String, StoreError> {
        self.setting("authentication_message").await
    }

    async fn find_account_by_token(
        &self,
        id: AccountId,
        token: &str,
    ) -> Result<Option<Account>, StoreError> {
        let row: Option<(String, Option<String>, String)> =
            sqlx::query_as("SELECT status, access_token, whitelist FROM accounts WHERE id = $1")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;
        let Some((status, access_token, whitelist)) = row else {
            return Ok(None);
        };

        let stored = access_token.as_deref().unwrap_or("");
        if !token_matches(stored, token) {
            return Ok(None);
        }

        Ok(Some(Account {
            id,
            status: AccountStatus::parse(&status)?,
            access_token,
            whitelist: split_whitelist(&whitelist),
        }))
    }

    fn register_listener(&self, listener: Arc<dyn StatusChangeListener>) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitelist_blob_round_trips() {
        let patterns = vec!["/a".to_string(), "/b".to_string()];
        assert_eq!(split_whitelist(&join_whitelist(&patterns)), patterns);
    }

    #[test]
    fn empty_blob_is_an_empty_list() {
        // Splitting "" must not yield a single empty entry
        assert!(split_whitelist("").is_empty());
        assert_eq!(join_whitelist(&[]), "");
    }

    #[test]
    fn blank_lines_are_preserved_for_the_matcher_to_skip() {
        assert_eq!(
            split_whitelist("/a\r\n\r\n/b"),
            vec!["/a".to_string(), String::new(), "/b".to_string()]
        );
    }
}
