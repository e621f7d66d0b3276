use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::db::models::{CreateVenue, Venue};
use crate::db::VenueRepository;
use crate::error::{AppError, AppResult};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_venues).post(create_venue))
        .route("/:id", get(get_venue))
        .route("/:id/calendar", put(set_calendar))
}

async fn list_venues(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Venue>>> {
    Ok(Json(VenueRepository::list_all(&state.db).await?))
}

async fn get_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Venue>> {
    VenueRepository::get(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Venue {} not found", id)))
}

async fn create_venue(
    State(state): State<Arc<AppState>>,
    Json(create): Json<CreateVenue>,
) -> AppResult<(StatusCode, Json<Venue>)> {
    if create.name.trim().is_empty() {
        return Err(AppError::Validation("Venue name is required".to_string()));
    }
    let venue = VenueRepository::create(&state.db, create).await?;
    Ok((StatusCode::CREATED, Json(venue)))
}

#[derive(Debug, Deserialize)]
struct SetCalendarRequest {
    /// `null` or blank detaches the venue from calendar sync.
    google_calendar_id: Option<String>,
}

async fn set_calendar(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<SetCalendarRequest>,
) -> AppResult<Json<Venue>> {
    let venue = VenueRepository::set_google_calendar_id(
        &state.db,
        &id,
        request.google_calendar_id.as_deref(),
    )
    .await?;
    Ok(Json(venue))
}
