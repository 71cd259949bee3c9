//! Shared application state

use std::sync::Arc;

use sqlx::PgPool;

use lockgate_core::{
    AccessDecisionEngine, AuthGate, BypassLinkIssuer, StatusStore, TokenGenerator,
};

use crate::auth::JwtManager;
use crate::config::Config;
use crate::store::PgStatusStore;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: PgPool,
    pub store: Arc<PgStatusStore>,
    pub engine: Arc<AccessDecisionEngine>,
    pub gate: Arc<AuthGate>,
    pub issuer: Arc<BypassLinkIssuer>,
    pub jwt: JwtManager,
}

impl AppState {
    /// Wire the core services against the Postgres store and register
    /// the status-change listener that provisions bypass tokens.
    pub fn new(config: Config, pool: PgPool) -> Self {
        let store = Arc::new(PgStatusStore::new(pool.clone()));
        let store_dyn: Arc<dyn StatusStore> = store.clone();

        let gate = Arc::new(AuthGate::new(store_dyn.clone(), TokenGenerator::new()));
        store.register_listener(gate.clone());

        let engine = Arc::new(AccessDecisionEngine::new(store_dyn.clone()));
        let issuer = Arc::new(BypassLinkIssuer::new(store_dyn, TokenGenerator::new()));

        let jwt = JwtManager::new(&config.jwt_secret, config.jwt_expiry_hours);

        Self {
            config: Arc::new(config),
            pool,
            store,
            engine,
            gate,
            issuer,
            jwt,
        }
    }
}
