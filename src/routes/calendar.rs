//! Manual calendar sync trigger and status.

use std::sync::Arc;

use axum::{extract::State, routing::get, routing::post, Json, Router};
use serde_json::json;

use crate::db::{BookingRepository, VenueRepository};
use crate::error::AppResult;
use crate::services::sync::CalendarSync;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync", post(sync_now))
        .route("/status", get(get_status))
}

/// Run a pull across all venue calendars and report what changed.
/// Per-event transport errors stay in the logs; users only see the
/// aggregate outcome.
async fn sync_now(State(state): State<Arc<AppState>>) -> AppResult<Json<serde_json::Value>> {
    let report = CalendarSync::pull_all(&state).await;

    let messages = if report.messages.is_empty() {
        vec!["No changes found".to_string()]
    } else {
        report.messages
    };

    Ok(Json(json!({
        "updated_count": report.updated,
        "messages": messages,
    })))
}

async fn get_status(State(state): State<Arc<AppState>>) -> AppResult<Json<serde_json::Value>> {
    let synced_venues = VenueRepository::find_with_calendar(&state.db).await?;
    let linked_bookings = BookingRepository::count_linked(&state.db).await?;

    Ok(Json(json!({
        "enabled": state.calendar.is_some() && !synced_venues.is_empty(),
        "credentials_loaded": state.calendar.is_some(),
        "synced_venues": synced_venues.len(),
        "linked_bookings": linked_bookings,
    })))
}
