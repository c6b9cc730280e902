// Account service: registration, login, token verification

use std::sync::Arc;
use tracing::Instrument;

use crate::api::validation::{validate_login, validate_registration};
use crate::auth::routes::{LoginRequest, RegisterRequest};
use crate::auth::{AuthConfig, AuthError, JwtService, TokenClaims};
use crate::storage::{
    error::{EMAIL_CONSTRAINT, USERNAME_CONSTRAINT},
    password::{hash_password, verify_password},
    CreateUserRow, StorageBackend, StorageError, UserRow,
};

pub struct AuthService {
    db: Arc<StorageBackend>,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(db: Arc<StorageBackend>, config: &AuthConfig) -> Self {
        Self {
            db,
            jwt: JwtService::new(config.jwt.clone()),
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Create an account. Nothing is stored unless every check passes.
    pub async fn register(&self, req: RegisterRequest) -> Result<UserRow, AuthError> {
        let username = req.username.trim().to_string();
        let span = tracing::info_span!("auth.register", username = %username, user_id = tracing::field::Empty);

        self.register_inner(username, req.password, req.email)
            .instrument(span)
            .await
    }

    async fn register_inner(
        &self,
        username: String,
        password: String,
        email: Option<String>,
    ) -> Result<UserRow, AuthError> {
        let email = email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        validate_registration(&username, &password, email.as_deref())?;

        if self.db.get_user_by_username(&username).await?.is_some() {
            return Err(AuthError::DuplicateUser);
        }
        if let Some(email) = email.as_deref() {
            if self.db.get_user_by_email(email).await?.is_some() {
                return Err(AuthError::DuplicateEmail);
            }
        }

        let password_hash = hash_password(&password)?;

        // A concurrent registration can still win between the lookup and the insert
        let user = self
            .db
            .create_user(CreateUserRow {
                username,
                password_hash,
                email,
            })
            .await
            .map_err(map_unique_violation)?;

        tracing::Span::current().record("user_id", user.id);
        tracing::info!("User registered");
        Ok(user)
    }

    /// Check credentials and issue a bearer token
    pub async fn login(&self, req: LoginRequest) -> Result<String, AuthError> {
        let username = req.username.trim().to_string();
        let span = tracing::info_span!("auth.login", username = %username);

        self.login_inner(username, req.password)
            .instrument(span)
            .await
    }

    async fn login_inner(&self, username: String, password: String) -> Result<String, AuthError> {
        validate_login(&username, &password)?;

        let Some(user) = self.db.get_user_by_username(&username).await? else {
            tracing::debug!("Login for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&password, &user.password_hash)? {
            tracing::debug!("Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt.issue_token(&user.username)?;
        tracing::info!("User logged in");
        Ok(token)
    }

    /// Verify a bearer token (`None` when the request carried no credentials)
    pub fn verify_token(&self, token: Option<&str>) -> Result<TokenClaims, AuthError> {
        match token {
            None => Err(AuthError::MissingToken),
            Some(token) => self.jwt.verify_token(token),
        }
    }
}

fn map_unique_violation(err: StorageError) -> AuthError {
    let duplicate = match err.constraint() {
        Some(USERNAME_CONSTRAINT) => Some(AuthError::DuplicateUser),
        Some(EMAIL_CONSTRAINT) => Some(AuthError::DuplicateEmail),
        _ => None,
    };
    duplicate.unwrap_or(AuthError::Storage(err))
}
