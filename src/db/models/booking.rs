use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Booking Models
// ============================================================================

/// A performer appearing at a venue during a date/time window.
///
/// `start_time` is not required to precede `end_time`: bookings legitimately
/// cross midnight (23:00-02:00) and are stored exactly as entered.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub venue_id: String,
    pub performer_id: String,
    pub activation_id: Option<String>,
    /// ID of the mirrored Google Calendar event, once a push has succeeded.
    pub google_event_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBooking {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub venue_id: String,
    pub performer_id: String,
    pub activation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBooking {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub venue_id: String,
    pub performer_id: String,
    pub activation_id: Option<String>,
}

/// Joined read model consumed by the event projector and the push paths.
///
/// Carries everything the external event body needs so a push never goes
/// back to the database, and so the delete hook can run from a pre-delete
/// snapshot (the venue row is unreachable through the booking afterwards).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookingDetail {
    pub id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub google_event_id: Option<String>,
    pub venue_id: String,
    pub venue_name: String,
    pub venue_address: Option<String>,
    pub venue_google_calendar_id: Option<String>,
    pub performer_name: String,
    pub performer_contact_number: Option<String>,
    pub activation_name: Option<String>,
}
