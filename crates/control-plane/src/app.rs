// Router assembly
// Decision: Health and OpenAPI routes are public; /protected and /events require a bearer token

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use eventdesk_core::EventStore;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api::{self, StatusResponse};
use crate::auth::{self, AuthState};
use crate::openapi::ApiDoc;

/// GET /ping - Liveness probe
#[utoipa::path(
    get,
    path = "/ping",
    responses(
        (status = 200, description = "Service is up", body = StatusResponse)
    ),
    tag = "health"
)]
pub async fn ping() -> Json<StatusResponse> {
    Json(StatusResponse::new("Healthy"))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router
pub fn router(auth_state: AuthState, store: Arc<EventStore>) -> Router {
    let events_state = api::events::EventsState::new(store, auth_state.clone());

    Router::new()
        .route("/ping", get(ping))
        .route("/api-doc/openapi.json", get(openapi_json))
        .merge(auth::routes(auth_state))
        .merge(api::events::routes(events_state))
        .layer(TraceLayer::new_for_http())
}

/// Add a CORS layer when origins are configured
pub fn with_cors(app: Router, origins: Vec<HeaderValue>) -> Router {
    if origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
        return app;
    }

    tracing::info!(origins = ?origins, "CORS origins configured");
    app.layer(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]),
    )
}
