// Authentication error taxonomy and its HTTP mapping
// Decision: Every token failure maps to 401, 403 is not used by this service
// Decision: Storage and internal failures surface as an opaque 500, details stay in the log

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::common::ErrorResponse;
use crate::storage::StorageError;

/// Message returned to clients for any 500
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Errors raised by registration, login, and token verification
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input failed a shape or length rule
    #[error("{0}")]
    Validation(String),

    #[error("Username already taken")]
    DuplicateUser,

    #[error("Email already registered")]
    DuplicateEmail,

    /// Unknown user or wrong password (deliberately indistinguishable)
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    MissingToken,

    /// Not a three-part token, or a part failed to decode
    #[error("Malformed token")]
    MalformedToken,

    #[error("Token expired")]
    ExpiredToken,

    /// Any other verification failure (bad signature, wrong algorithm, ...)
    #[error("Invalid token")]
    InvalidSignature,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AuthError::Validation(msg.into())
    }

    /// Canonical status mapping
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::DuplicateUser | AuthError::DuplicateEmail => {
                StatusCode::BAD_REQUEST
            }
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::MalformedToken
            | AuthError::ExpiredToken
            | AuthError::InvalidSignature => StatusCode::UNAUTHORIZED,
            AuthError::Storage(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show a client
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Storage(_) | AuthError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Auth request failed: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "Auth request rejected: {}", self);
        }

        let mut response = (status, Json(ErrorResponse::new(self.client_message()))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::validation("too short").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::DuplicateUser.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::MalformedToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::ExpiredToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::InvalidSignature.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Storage(StorageError::Database(sqlx::Error::PoolTimedOut)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = AuthError::Internal(anyhow::anyhow!("SELECT password FROM users failed"));
        assert_eq!(err.client_message(), INTERNAL_ERROR_MESSAGE);
        assert!(err.to_string().contains("SELECT"));
    }

    #[test]
    fn test_duplicate_message() {
        assert_eq!(
            AuthError::DuplicateUser.client_message(),
            "Username already taken"
        );
    }

    #[test]
    fn test_unauthorized_response_has_challenge() {
        let response = AuthError::ExpiredToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let response = AuthError::DuplicateUser.into_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
