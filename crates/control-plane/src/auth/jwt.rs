// JWT token service for authentication
// Decision: Use HS256 algorithm for simplicity (symmetric key)
// Decision: Tokens are stateless: no storage, no revocation, expiry is the only lifetime control

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::config::JwtConfig;
use super::error::AuthError;

/// JWT claims carried by a bearer token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, ToSchema)]
pub struct TokenClaims {
    /// Username the token was issued to
    #[schema(example = "alice")]
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// JWT service for token generation and validation
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Issue a token for `username`, valid from now
    pub fn issue_token(&self, username: &str) -> Result<String> {
        self.issue_token_at(username, Utc::now())
    }

    /// Issue a token as if it had been created at `issued_at`
    pub fn issue_token_at(&self, username: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let lifetime = Duration::from_std(self.config.token_lifetime)?;
        let exp = issued_at
            .checked_add_signed(lifetime)
            .context("Token expiry is out of range")?;

        let claims = TokenClaims {
            username: username.to_string(),
            iat: issued_at.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).context("Failed to encode token")
    }

    /// Validate and decode a token
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        if token.split('.').count() != 3 {
            return Err(AuthError::MalformedToken);
        }

        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                classify_jwt_error(e.kind())
            })?;

        Ok(token_data.claims)
    }

    /// Token lifetime in seconds
    pub fn token_lifetime_secs(&self) -> i64 {
        i64::try_from(self.config.token_lifetime.as_secs()).unwrap_or(i64::MAX)
    }
}

/// Map a jsonwebtoken failure onto the auth taxonomy
fn classify_jwt_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => AuthError::MalformedToken,
        _ => AuthError::InvalidSignature,
    }
}
