// Authentication HTTP routes
// Decision: Routes sit at the root (/register, /login, /protected), no version prefix
// Decision: Unparseable JSON bodies are reported as 400, not axum's default 415/422

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    error::AuthError,
    jwt::TokenClaims,
    middleware::{AuthState, AuthUser},
};
use crate::api::common::{json_rejection_message, ErrorResponse, StatusResponse};

/// Register request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Surrounding whitespace is trimmed, at least 3 characters remain
    #[schema(example = "alice")]
    pub username: String,
    /// At least 5 characters
    #[schema(example = "pass1234")]
    pub password: String,
    #[serde(default)]
    #[schema(example = "alice@example.com")]
    pub email: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "pass1234")]
    pub password: String,
}

/// Successful login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = "Login successful!")]
    pub status: String,
    /// Bearer token for the Authorization header
    pub token: String,
}

/// Body of the protected probe route
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProtectedResponse {
    #[schema(example = "This is a protected route")]
    pub message: String,
    /// Claims of the token that was presented
    pub user: TokenClaims,
}

/// Create auth routes
pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/protected", get(protected))
        .with_state(state)
}

fn body_or_400<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AuthError::Validation(json_rejection_message(&rejection)))
}

/// POST /register - Create an account
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = StatusResponse),
        (status = 400, description = "Invalid input or duplicate username/email", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AuthState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AuthError> {
    let req = body_or_400(payload)?;
    state.service.register(req).await?;

    Ok(Json(StatusResponse::new("User registered successfully!")))
}

/// POST /login - Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing username or password", body = ErrorResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AuthError> {
    let req = body_or_400(payload)?;
    let token = state.service.login(req).await?;

    Ok(Json(LoginResponse {
        status: "Login successful!".to_string(),
        token,
    }))
}

/// GET /protected - Echo the identity carried by the bearer token
#[utoipa::path(
    get,
    path = "/protected",
    responses(
        (status = 200, description = "Token accepted", body = ProtectedResponse),
        (status = 401, description = "Missing, malformed, expired or forged token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn protected(user: AuthUser) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "This is a protected route".to_string(),
        user: user.claims,
    })
}
