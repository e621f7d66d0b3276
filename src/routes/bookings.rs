//! Booking command handlers.
//!
//! These are the only writers of booking rows outside the sync engine's
//! narrow updates. Each mutation commits locally first, then invokes the
//! matching post-commit push hook with a fresh (or, for delete, pre-delete)
//! `BookingDetail` snapshot. The hooks themselves never write through this
//! path again, which keeps the push recursion-free.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::db::models::{Booking, CreateBooking, UpdateBooking};
use crate::db::{BookingRepository, PerformerRepository, VenueRepository};
use crate::error::{AppError, AppResult};
use crate::services::sync::CalendarSync;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route(
            "/:id",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
}

#[derive(Debug, Deserialize)]
struct BookingRequest {
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    venue_id: String,
    performer_id: String,
    activation_id: Option<String>,
    /// Email stakeholders once the calendar push succeeds.
    #[serde(default)]
    notify: bool,
}

async fn validate_references(state: &Arc<AppState>, request: &BookingRequest) -> AppResult<()> {
    if VenueRepository::get(&state.db, &request.venue_id)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest(format!(
            "Unknown venue {}",
            request.venue_id
        )));
    }
    if PerformerRepository::get(&state.db, &request.performer_id)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest(format!(
            "Unknown performer {}",
            request.performer_id
        )));
    }
    Ok(())
}

/// Notify stakeholders after a successful push, when asked to.
async fn maybe_notify(state: &Arc<AppState>, booking_id: &str, pushed: bool, notify: bool) {
    if !(pushed && notify) {
        return;
    }
    let Some(mail) = state.mail.as_ref() else {
        tracing::debug!("Notification requested but mail is not configured");
        return;
    };
    match BookingRepository::get_detail(&state.db, booking_id).await {
        Ok(Some(detail)) => {
            if let Err(e) = mail.send_booking_confirmation(&detail).await {
                tracing::warn!(
                    "Failed to send confirmation for booking {}: {:?}",
                    booking_id,
                    e
                );
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Failed to load booking {} for mail: {:?}", booking_id, e),
    }
}

async fn list_bookings(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Booking>>> {
    Ok(Json(BookingRepository::list_all(&state.db).await?))
}

async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Booking>> {
    BookingRepository::get(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BookingRequest>,
) -> AppResult<(StatusCode, Json<Booking>)> {
    validate_references(&state, &request).await?;

    let booking = BookingRepository::create(
        &state.db,
        CreateBooking {
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            venue_id: request.venue_id.clone(),
            performer_id: request.performer_id.clone(),
            activation_id: request.activation_id.clone(),
        },
    )
    .await?;

    // Local row is durable; mirror it out and link the event id.
    let mut pushed = false;
    if let Some(detail) = BookingRepository::get_detail(&state.db, &booking.id).await? {
        pushed = CalendarSync::booking_created(&state, &detail).await;
    }
    maybe_notify(&state, &booking.id, pushed, request.notify).await;

    // Re-read so the response carries the freshly linked event id.
    let booking = BookingRepository::get(&state.db, &booking.id)
        .await?
        .unwrap_or(booking);
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn update_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<BookingRequest>,
) -> AppResult<Json<Booking>> {
    validate_references(&state, &request).await?;

    let booking = BookingRepository::update(
        &state.db,
        &id,
        UpdateBooking {
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            venue_id: request.venue_id.clone(),
            performer_id: request.performer_id.clone(),
            activation_id: request.activation_id.clone(),
        },
    )
    .await?;

    let mut pushed = false;
    if let Some(detail) = BookingRepository::get_detail(&state.db, &booking.id).await? {
        pushed = CalendarSync::booking_saved(&state, &detail).await;
    }
    maybe_notify(&state, &booking.id, pushed, request.notify).await;

    let booking = BookingRepository::get(&state.db, &booking.id)
        .await?
        .unwrap_or(booking);
    Ok(Json(booking))
}

async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    // Snapshot before the row disappears; the delete push needs the venue
    // calendar and event id from it.
    let snapshot = BookingRepository::get_detail(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))?;

    BookingRepository::delete(&state.db, &id).await?;
    CalendarSync::booking_deleted(&state, &snapshot).await;

    Ok(StatusCode::NO_CONTENT)
}
