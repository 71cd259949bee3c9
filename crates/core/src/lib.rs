//! Lockgate access-decision core.
//!
//! Gates access to a web application based on a per-account status
//! (normal / locked / disabled), with out-of-band bypass via an opaque
//! per-account token carried in a URL. This crate is intentionally
//! decoupled from HTTP and storage: persistence goes through the
//! [`StatusStore`] contract and the session mechanism through the
//! [`Session`] contract, so hosts can plug in their own.

pub mod bypass;
pub mod engine;
pub mod error;
pub mod gate;
pub mod query;
pub mod session;
pub mod store;
pub mod token;
pub mod whitelist;

pub use bypass::BypassLinkIssuer;
pub use engine::{AccessDecisionEngine, Decision};
pub use error::{GateError, GateResult};
pub use gate::AuthGate;
pub use query::{BypassCredential, ACCOUNT_PARAM, TOKEN_PARAM};
pub use session::{MemorySession, Session};
pub use store::{token_matches, MemoryStatusStore, StatusChangeListener, StatusStore};
pub use token::TokenGenerator;
