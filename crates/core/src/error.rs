//! Gate error types

use thiserror::Error;

use lockgate_shared::{AccountId, StoreError};

/// Errors surfaced by the access-decision core.
#[derive(Debug, Error)]
pub enum GateError {
    /// The target account does not exist (bypass-link issuance only; an
    /// invalid bypass *credential* is never an error, it fails closed
    /// into the disabled-redirect path).
    #[error("invalid account: {0}")]
    InvalidAccount(AccountId),

    /// Login rejected because the account status is not Normal. The
    /// message is the store-configured one and never reveals whether the
    /// account is locked or disabled.
    #[error("{0}")]
    LoginRejected(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type GateResult<T> = Result<T, GateError>;
