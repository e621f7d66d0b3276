//! Pure translation between local bookings and external calendar events.
//!
//! Outbound: a `BookingDetail` becomes a Google event body. Inbound: the
//! `start`/`end` sub-objects of a listed event are reduced back to the
//! date/time components the booking model stores. Nothing in here touches
//! the database or the network.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::db::models::BookingDetail;
use crate::services::google_calendar::{EventBody, EventTime};

/// Build the external event body for a booking.
///
/// The `end` timestamp reuses the booking's own date even when the booking
/// crosses midnight (end < start). That is how operators enter these shows
/// and the round trip back preserves it.
pub fn event_body(detail: &BookingDetail, timezone: &str) -> EventBody {
    let description = format!(
        "Performer: {}\nVenue: {}\nActivation: {}\nContact: {}",
        detail.performer_name,
        detail.venue_name,
        detail.activation_name.as_deref().unwrap_or("None"),
        detail.performer_contact_number.as_deref().unwrap_or("N/A"),
    );

    EventBody {
        summary: format!("{} @ {}", detail.performer_name, detail.venue_name),
        location: detail
            .venue_address
            .clone()
            .unwrap_or_else(|| detail.venue_name.clone()),
        description,
        start: timed(detail.date, detail.start_time, timezone),
        end: timed(detail.date, detail.end_time, timezone),
    }
}

fn timed(date: NaiveDate, time: NaiveTime, timezone: &str) -> EventTime {
    EventTime {
        date_time: Some(
            NaiveDateTime::new(date, time)
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string(),
        ),
        date: None,
        time_zone: Some(timezone.to_string()),
    }
}

/// Reduce an external event's `start`/`end` to booking time components.
///
/// Returns `None` when either side is unparseable, which includes all-day
/// events (date-only, no `dateTime`): the booking model has no
/// representation for those, so pull skips them. The date comes from the
/// start side; the end side contributes only its time, matching the
/// outbound projection.
pub fn extract_times(start: &EventTime, end: &EventTime) -> Option<(NaiveDate, NaiveTime, NaiveTime)> {
    let start_dt = parse_event_datetime(start)?;
    let end_dt = parse_event_datetime(end)?;
    Some((start_dt.date(), start_dt.time(), end_dt.time()))
}

/// Parse the `dateTime` field, wall-clock in the calendar's timezone.
/// Offset-qualified RFC 3339 and bare (offset-less) timestamps are both
/// accepted; the offset is dropped rather than converted, so the local
/// components stay what the calendar displays.
fn parse_event_datetime(time: &EventTime) -> Option<NaiveDateTime> {
    let raw = time.date_time.as_deref()?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok()
}
