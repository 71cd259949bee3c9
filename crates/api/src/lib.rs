//! Lockgate API Library
//!
//! HTTP surface for the lockgate access-decision core: the per-request
//! gate middleware, login/password-reset endpoints, admin endpoints, and
//! the Postgres-backed status store.

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
pub use store::PgStatusStore;
