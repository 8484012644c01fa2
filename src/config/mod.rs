use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_rate_limiting: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
    pub max_request_size_bytes: usize,
    pub cdn_url: String,
    pub docs_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub session_cookie_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. The in-memory store is used when unset.
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        override_parsed(&mut self.api.enable_rate_limiting, "API_ENABLE_RATE_LIMITING");
        override_parsed(&mut self.api.rate_limit_requests, "API_RATE_LIMIT_REQUESTS");
        override_parsed(&mut self.api.rate_limit_window_secs, "API_RATE_LIMIT_WINDOW_SECS");
        override_parsed(&mut self.api.max_request_size_bytes, "API_MAX_REQUEST_SIZE_BYTES");
        override_parsed(&mut self.api.cdn_url, "CACHE_CDN_URL");
        override_parsed(&mut self.api.docs_url, "API_DOCS_URL");

        override_parsed(&mut self.security.enable_cors, "SECURITY_ENABLE_CORS");
        if let Ok(origins) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
        }
        override_parsed(&mut self.security.jwt_secret, "SECURITY_JWT_SECRET");
        override_parsed(&mut self.security.jwt_expiry_hours, "SECURITY_JWT_EXPIRY_HOURS");
        override_parsed(&mut self.security.session_cookie_name, "SECURITY_SESSION_COOKIE");

        if let Ok(url) = env::var("DATABASE_URL") {
            self.database.url = Some(url).filter(|url| !url.trim().is_empty());
        }
        override_parsed(&mut self.database.max_connections, "DATABASE_MAX_CONNECTIONS");
        override_parsed(&mut self.database.connection_timeout, "DATABASE_CONNECTION_TIMEOUT");

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                enable_rate_limiting: false,
                rate_limit_requests: 1000,
                rate_limit_window_secs: 60,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                cdn_url: "http://localhost:5500/cdn".to_string(),
                docs_url: "https://docs.crmm.tech".to_string(),
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "development-only-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                session_cookie_name: "auth-session".to_string(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 300,
                rate_limit_window_secs: 60,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
                cdn_url: "https://cdn.staging.crmm.tech".to_string(),
                docs_url: "https://docs.crmm.tech".to_string(),
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.crmm.tech".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
                session_cookie_name: "auth-session".to_string(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 100,
                rate_limit_window_secs: 60,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
                cdn_url: "https://cdn.crmm.tech".to_string(),
                docs_url: "https://docs.crmm.tech".to_string(),
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://crmm.tech".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 30,
                session_cookie_name: "auth-session".to_string(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
        }
    }
}

/// Replaces `field` with the parsed value of `var`; unparsable values are ignored
fn override_parsed<T: FromStr>(field: &mut T, var: &str) {
    let Ok(raw) = env::var(var) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *field = value,
        Err(_) => tracing::warn!("Ignoring invalid value for {}", var),
    }
}

/// Process-wide configuration for the binary, read from the environment on first use
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
