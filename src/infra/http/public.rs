use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::application::{
    error::{HttpError, repo_error_to_http},
    event::EventService,
    filters::ListingQuery,
    listing::EventsListingService,
    repos::HealthRepo,
};

use super::{
    db_health_response,
    middleware::{log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub listing: Arc<EventsListingService>,
    pub events: Arc<EventService>,
    pub health: Arc<dyn HealthRepo>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/events", get(events_index))
        .route("/events/{slug}", get(event_detail))
        .route("/_health/db", get(public_health))
        .fallback(fallback_router)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn events_index(
    State(state): State<HttpState>,
    RawQuery(raw): RawQuery,
) -> Result<Response, HttpError> {
    let query = ListingQuery::parse(raw.as_deref().unwrap_or_default());
    let context = state.listing.page_context(&query).await?;
    Ok(Json(context).into_response())
}

async fn event_detail(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
) -> Result<Response, HttpError> {
    const SOURCE: &str = "infra::http::public::event_detail";

    match state.events.event_detail(&slug).await {
        Ok(Some(context)) => Ok(Json(context).into_response()),
        Ok(None) => Err(HttpError::new(
            SOURCE,
            StatusCode::NOT_FOUND,
            "Event not found",
            format!("no published event with slug `{slug}`"),
        )),
        Err(err) => Err(repo_error_to_http(SOURCE, err)),
    }
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.health.ping().await)
}

async fn fallback_router() -> HttpError {
    HttpError::new(
        "infra::http::public::fallback_router",
        StatusCode::NOT_FOUND,
        "Not found",
        "no route matched the request",
    )
}
