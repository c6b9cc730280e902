// Authentication configuration loaded from environment variables.
// Decision: Follow the AUTH_ prefix convention, accept plain JWT_SECRET as a fallback
// Decision: Without a configured secret, generate a random one (tokens die with the process)

use std::time::Duration;

/// Default token lifetime: one hour
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 60 * 60;
/// Longer configured lifetimes are clamped to one year
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWTs (HS256)
    pub secret: String,
    /// How long an issued token stays valid
    pub token_lifetime: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_lifetime: Duration::from_secs(DEFAULT_TOKEN_LIFETIME_SECS),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Whether the secret was generated at startup rather than configured
    pub ephemeral_secret: bool,
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let secret = std::env::var("AUTH_JWT_SECRET")
            .or_else(|_| std::env::var("JWT_SECRET"))
            .ok()
            .filter(|s| !s.is_empty());

        let lifetime = std::env::var("AUTH_JWT_TOKEN_LIFETIME")
            .ok()
            .and_then(|s| s.parse().ok());

        Self::from_parts(secret, lifetime)
    }

    fn from_parts(secret: Option<String>, lifetime_secs: Option<u64>) -> Self {
        let (secret, ephemeral_secret) = match secret {
            Some(secret) => (secret, false),
            None => {
                tracing::warn!(
                    "AUTH_JWT_SECRET not set, using a random secret (tokens will not survive a restart)"
                );
                (generate_secret(), true)
            }
        };

        let token_lifetime = lifetime_secs
            .filter(|secs| *secs > 0)
            .map(|secs| Duration::from_secs(secs.min(MAX_TOKEN_LIFETIME_SECS)))
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_TOKEN_LIFETIME_SECS));

        Self {
            jwt: JwtConfig {
                secret,
                token_lifetime,
            },
            ephemeral_secret,
        }
    }

    /// Config with a fixed secret (tests, tools)
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self::from_parts(Some(secret.into()), None)
    }
}

fn generate_secret() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}
