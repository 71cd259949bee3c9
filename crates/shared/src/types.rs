//! Common types used across lockgate

use serde::{Deserialize, Serialize};

// =============================================================================
// ID Wrappers
// =============================================================================

/// Account ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub i64);

impl From<i64> for AccountId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Per-account access status.
///
/// Independent of credential validity: a Locked or Disabled account may
/// still hold perfectly valid credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Business as usual.
    Normal,
    /// Blocked except for whitelisted URLs and bypass links.
    Locked,
    /// Blocked everywhere; whitelists are never consulted.
    Disabled,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Normal => "normal",
            AccountStatus::Locked => "locked",
            AccountStatus::Disabled => "disabled",
        }
    }

    /// Parse the stored representation. Unknown values are an error so a
    /// corrupt status row can never fall through to `Normal`.
    pub fn parse(s: &str) -> Result<Self, crate::StoreError> {
        match s {
            "normal" => Ok(AccountStatus::Normal),
            "locked" => Ok(AccountStatus::Locked),
            "disabled" => Ok(AccountStatus::Disabled),
            other => Err(crate::StoreError::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Domain records
// =============================================================================

/// One account as seen through the status store.
///
/// The decision engine reads this per request and never caches it; the
/// store owns the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub status: AccountStatus,
    /// Opaque bypass token; non-empty for every account that has been
    /// set to Locked at least once.
    pub access_token: Option<String>,
    /// Ordered personal URL whitelist.
    pub whitelist: Vec<String>,
}

/// Emitted synchronously by `set_status` to registered listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChangeEvent {
    pub account_id: AccountId,
    pub old: AccountStatus,
    pub new: AccountStatus,
}
