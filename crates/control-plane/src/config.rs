// Server configuration loaded from environment variables
// Decision: Without DATABASE_URL the server runs against the in-memory user store (dev mode)

use axum::http::HeaderValue;

use crate::auth::AuthConfig;
use eventdesk_core::EventStoreConfig;

/// Port used when PORT is unset or unparseable
pub const DEFAULT_PORT: u16 = 3000;

/// Everything the server reads from the environment at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Postgres connection string, `None` for dev mode
    pub database_url: Option<String>,
    /// Allowed cross-origin callers, empty means same-origin only
    pub cors_origins: Vec<HeaderValue>,
    pub auth: AuthConfig,
    pub events: EventStoreConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parse_port(std::env::var("PORT").ok().as_deref()),
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            cors_origins: parse_cors_origins(std::env::var("CORS_ALLOWED_ORIGINS").ok().as_deref()),
            auth: AuthConfig::from_env(),
            events: EventStoreConfig::from_env(),
        }
    }
}

fn parse_port(value: Option<&str>) -> u16 {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => DEFAULT_PORT,
        Some(v) => v.parse().unwrap_or_else(|_| {
            tracing::warn!(value = %v, "Invalid PORT, using {}", DEFAULT_PORT);
            DEFAULT_PORT
        }),
    }
}

/// Example: CORS_ALLOWED_ORIGINS="https://app.example.com,https://admin.example.com"
fn parse_cors_origins(value: Option<&str>) -> Vec<HeaderValue> {
    value
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|s| s.parse().ok())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port() {
        assert_eq!(parse_port(None), 3000);
        assert_eq!(parse_port(Some("")), 3000);
        assert_eq!(parse_port(Some("8080")), 8080);
        assert_eq!(parse_port(Some("not-a-port")), 3000);
        assert_eq!(parse_port(Some("70000")), 3000);
    }

    #[test]
    fn test_cors_origins() {
        assert!(parse_cors_origins(None).is_empty());
        assert!(parse_cors_origins(Some("")).is_empty());

        let origins = parse_cors_origins(Some("https://a.example.com, https://b.example.com,"));
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[1], "https://b.example.com");
    }
}
