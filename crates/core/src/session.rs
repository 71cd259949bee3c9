//! Session contract
//!
//! The core never owns the session mechanism; it drives whatever the
//! host provides through this trait, once per request.

use lockgate_shared::AccountId;

/// Per-request view of the host's session state.
///
/// A session is established iff `current_account()` is `Some`. Mutations
/// apply to the request in flight; the host decides how they persist
/// (cookies, server-side state, ...).
pub trait Session: Send {
    fn current_account(&self) -> Option<AccountId>;

    /// Establish a session for `account_id`, replacing any existing one.
    fn establish(&mut self, account_id: AccountId);

    /// Terminate the session, if any.
    fn terminate(&mut self);
}

/// Trivial in-process session, for tests and embedders without a
/// framework session layer.
#[derive(Debug, Default, Clone)]
pub struct MemorySession {
    current: Option<AccountId>,
}

impl MemorySession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn established(account_id: AccountId) -> Self {
        Self {
            current: Some(account_id),
        }
    }
}

impl Session for MemorySession {
    fn current_account(&self) -> Option<AccountId> {
        self.current
    }

    fn establish(&mut self, account_id: AccountId) {
        self.current = Some(account_id);
    }

    fn terminate(&mut self) {
        self.current = None;
    }
}
