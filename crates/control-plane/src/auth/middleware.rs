// Authentication middleware and extractors
// Decision: Only `Authorization: Bearer <token>` is accepted, there are no cookie sessions
// Decision: The layer stores the verified user in request extensions, the extractor reuses it

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{config::AuthConfig, error::AuthError, jwt::TokenClaims};
use crate::services::AuthService;
use crate::storage::StorageBackend;

/// Authenticated user context extracted from request
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Username carried by the token
    pub username: String,
    /// Decoded claims
    pub claims: TokenClaims,
}

impl From<TokenClaims> for AuthUser {
    fn from(claims: TokenClaims) -> Self {
        Self {
            username: claims.username.clone(),
            claims,
        }
    }
}

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub config: AuthConfig,
    pub service: Arc<AuthService>,
}

impl AuthState {
    pub fn new(config: AuthConfig, db: Arc<StorageBackend>) -> Self {
        let service = Arc::new(AuthService::new(db, &config));
        Self { config, service }
    }
}

/// Extractor for authenticated user
/// This is required - returns 401 if not authenticated
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let auth_state = AuthState::from_ref(state);
        authenticate(&parts.headers, &auth_state)
    }
}

/// Gate for route groups: rejects the request unless it carries a valid token
///
/// Use with `axum::middleware::from_fn_with_state`. On success the [`AuthUser`]
/// is available to handlers as `Extension<AuthUser>` or through the extractor.
pub async fn require_auth(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = authenticate(request.headers(), &state)?;
    tracing::debug!(username = %user.username, "Request authenticated");
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Verify the bearer token in `headers`
fn authenticate(headers: &HeaderMap, state: &AuthState) -> Result<AuthUser, AuthError> {
    let token = bearer_token(headers)?;
    let claims = state.service.verify_token(token)?;
    Ok(claims.into())
}

/// Pull the token out of the Authorization header
///
/// No header yields `Ok(None)`. A header that is not valid text, or that uses
/// a scheme other than Bearer, is a malformed credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| AuthError::MalformedToken)?;
    let value = value.trim();

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("Bearer") => Ok(Some(token.trim())),
        // "Bearer" with nothing after it
        None if value.eq_ignore_ascii_case("Bearer") => Ok(Some("")),
        _ => Err(AuthError::MalformedToken),
    }
}
