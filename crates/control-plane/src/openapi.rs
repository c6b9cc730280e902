// OpenAPI specification generation
//
// This module defines the OpenAPI spec for the EventDesk API.
// It is served by the API server at /api-doc/openapi.json and written
// out by the export-openapi binary.

use crate::api::{self, ErrorResponse, ListResponse, StatusResponse};
use crate::{app, auth};
use eventdesk_core::{Event, EventInput, EventPatch, SortOrder};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI documentation for the EventDesk API
#[derive(OpenApi)]
#[openapi(
    paths(
        app::ping,
        auth::routes::register,
        auth::routes::login,
        auth::routes::protected,
        api::events::list_events,
        api::events::create_event,
        api::events::get_event,
        api::events::update_event,
        api::events::delete_event,
        api::events::save_events,
    ),
    components(
        schemas(
            ErrorResponse, StatusResponse,
            auth::routes::RegisterRequest, auth::routes::LoginRequest,
            auth::routes::LoginResponse, auth::routes::ProtectedResponse,
            auth::TokenClaims,
            Event, EventInput, EventPatch, SortOrder,
            api::events::SortField,
            ListResponse<Event>,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "auth", description = "Registration, login and token check"),
        (name = "events", description = "Calendar event management endpoints")
    ),
    info(
        title = "EventDesk API",
        version = "0.1.0",
        description = "Account registration, bearer-token authentication and calendar event management",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected routes
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

impl ApiDoc {
    /// Generate the OpenAPI spec as a pretty-printed JSON string
    pub fn to_json() -> serde_json::Result<String> {
        Self::openapi().to_pretty_json()
    }
}
