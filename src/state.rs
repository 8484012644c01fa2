use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::controllers::Controllers;
use crate::database::Store;
use crate::middleware::{JwtSessionResolver, NoopRateLimiter, RateLimiter, SessionResolver, WindowRateLimiter};

/// Shared state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub sessions: Arc<dyn SessionResolver>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub controllers: Controllers,
}

impl AppState {
    /// Wires the default collaborators from configuration
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn Store>) -> Self {
        let sessions: Arc<dyn SessionResolver> = Arc::new(JwtSessionResolver::new(
            config.security.jwt_secret.clone(),
            config.security.session_cookie_name.clone(),
        ));

        let rate_limiter: Arc<dyn RateLimiter> = if config.api.enable_rate_limiting {
            Arc::new(WindowRateLimiter::new(
                config.api.rate_limit_requests,
                Duration::from_secs(config.api.rate_limit_window_secs),
            ))
        } else {
            Arc::new(NoopRateLimiter)
        };

        Self {
            controllers: Controllers::from_store(store.clone()),
            config,
            store,
            sessions,
            rate_limiter,
        }
    }

    pub fn with_controllers(mut self, controllers: Controllers) -> Self {
        self.controllers = controllers;
        self
    }

    pub fn with_sessions(mut self, sessions: Arc<dyn SessionResolver>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }
}
