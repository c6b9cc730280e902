// Calendar event HTTP routes
// Decision: Every /events route sits behind the bearer-token gate
// Decision: Successful mutations are written through to the events file when one is configured

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRef, Path, Query, State,
    },
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use eventdesk_core::store::sort_events;
use eventdesk_core::{Event, EventInput, EventPatch, EventStore, EventStoreError, SortOrder};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use super::common::{json_rejection_message, ErrorResponse, ListResponse};
use crate::auth::error::INTERNAL_ERROR_MESSAGE;
use crate::auth::{require_auth, AuthState, AuthUser};

/// App state for event routes
#[derive(Clone)]
pub struct EventsState {
    pub store: Arc<EventStore>,
    pub auth: AuthState,
}

impl EventsState {
    pub fn new(store: Arc<EventStore>, auth: AuthState) -> Self {
        Self { store, auth }
    }
}

impl FromRef<EventsState> for AuthState {
    fn from_ref(input: &EventsState) -> Self {
        input.auth.clone()
    }
}

/// Field used to order a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    /// Event start time
    Start,
    /// Time the event was added
    Created,
}

/// Query parameters for listing events
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListEventsQuery {
    /// Case-insensitive substring match on the title
    pub search: Option<String>,
    /// Sort field. Without it the listing keeps insertion order.
    pub sort: Option<SortField>,
    /// Sort direction (default `asc`). Given alone, sorts by start.
    pub order: Option<SortOrder>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<T, ApiError>;

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ErrorResponse::new(msg).into_response(status)
}

fn not_found() -> ApiError {
    api_error(StatusCode::NOT_FOUND, "Event not found")
}

fn store_error(e: EventStoreError) -> ApiError {
    match e {
        EventStoreError::InvalidEvent(_) => api_error(StatusCode::BAD_REQUEST, e.to_string()),
        EventStoreError::NoFileConfigured => {
            api_error(StatusCode::CONFLICT, "Event persistence is disabled")
        }
        EventStoreError::Io(_) | EventStoreError::Serialization(_) => {
            tracing::error!("Event storage failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

fn event_id(path: Result<Path<u64>, PathRejection>) -> ApiResult<u64> {
    path.map(|Path(id)| id)
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Event id must be a positive integer"))
}

fn body_or_400<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| api_error(StatusCode::BAD_REQUEST, json_rejection_message(&rejection)))
}

/// Write the collection through to disk after a mutation
async fn autosave(store: &EventStore) -> ApiResult<()> {
    if store.events_file().is_none() {
        return Ok(());
    }
    store.save_to_file().await.map_err(store_error)
}

/// Create event routes
pub fn routes(state: EventsState) -> Router {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/save", post(save_events))
        .route(
            "/events/:event_id",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_auth,
        ))
        .with_state(state)
}

/// GET /events - List events, optionally filtered and sorted
#[utoipa::path(
    get,
    path = "/events",
    params(ListEventsQuery),
    responses(
        (status = 200, description = "List of events", body = ListResponse<Event>),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<EventsState>,
    query: Result<Query<ListEventsQuery>, QueryRejection>,
) -> ApiResult<Json<ListResponse<Event>>> {
    let Query(query) =
        query.map_err(|rejection| api_error(StatusCode::BAD_REQUEST, rejection.body_text()))?;

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let sort = query.sort.or(query.order.map(|_| SortField::Start));
    let order = query.order.unwrap_or_default();

    let events = match (search, sort) {
        (None, None) => state.store.list(),
        (None, Some(SortField::Start)) => state.store.sorted_by_start(order),
        (None, Some(SortField::Created)) => state.store.sorted_by_creation(order),
        (Some(search), sort) => {
            let mut events = state.store.search_by_title(search);
            match sort {
                Some(SortField::Start) => sort_events(&mut events, order, |e| e.start),
                Some(SortField::Created) => sort_events(&mut events, order, |e| e.created_at),
                None => {}
            }
            events
        }
    };

    Ok(Json(ListResponse::new(events)))
}

/// POST /events - Add an event
#[utoipa::path(
    post,
    path = "/events",
    request_body = EventInput,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Empty title or start not before end", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<EventsState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<EventInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    let input = body_or_400(payload)?;
    let event = state.store.add(input).map_err(store_error)?;
    tracing::info!(event_id = event.id, user = %user.username, "Event created");

    autosave(&state.store).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /events/{event_id} - Get one event
#[utoipa::path(
    get,
    path = "/events/{event_id}",
    params(
        ("event_id" = u64, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = Event),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "events"
)]
pub async fn get_event(
    State(state): State<EventsState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<Event>> {
    let id = event_id(path)?;
    state.store.get(id).map(Json).ok_or_else(not_found)
}

/// PATCH /events/{event_id} - Update an event. Only provided fields change.
#[utoipa::path(
    patch,
    path = "/events/{event_id}",
    params(
        ("event_id" = u64, Path, description = "Event ID")
    ),
    request_body = EventPatch,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Result would be invalid", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "events"
)]
pub async fn update_event(
    State(state): State<EventsState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<EventPatch>, JsonRejection>,
) -> ApiResult<Json<Event>> {
    let id = event_id(path)?;
    let patch = body_or_400(payload)?;

    let event = state
        .store
        .update(id, patch)
        .map_err(store_error)?
        .ok_or_else(not_found)?;
    tracing::info!(event_id = id, user = %user.username, "Event updated");

    autosave(&state.store).await?;
    Ok(Json(event))
}

/// DELETE /events/{event_id} - Remove an event
#[utoipa::path(
    delete,
    path = "/events/{event_id}",
    params(
        ("event_id" = u64, Path, description = "Event ID")
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "events"
)]
pub async fn delete_event(
    State(state): State<EventsState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = event_id(path)?;
    if !state.store.delete(id) {
        return Err(not_found());
    }
    tracing::info!(event_id = id, user = %user.username, "Event deleted");

    autosave(&state.store).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /events/save - Write the collection to the events file now
#[utoipa::path(
    post,
    path = "/events/save",
    responses(
        (status = 204, description = "Events saved"),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 409, description = "No events file configured", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "events"
)]
pub async fn save_events(State(state): State<EventsState>) -> ApiResult<StatusCode> {
    state.store.save_to_file().await.map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}
