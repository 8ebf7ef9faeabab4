use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::{GameStore, HealthCheck, Stores, UserStore};

/// Shared, read-only application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn UserStore>,
    pub games: Arc<dyn GameStore>,
    pub health: Arc<dyn HealthCheck>,
}

impl AppState {
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        let tokens = TokenService::new(&config.security);
        Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            users: stores.users,
            games: stores.games,
            health: stores.health,
        }
    }
}
