//! Bidirectional calendar synchronization.
//!
//! Push: post-commit hooks invoked by the booking handlers after a local
//! mutation is durable. Pull: per-venue reconciliation of upcoming external
//! events back into booking time fields. The two sides never re-trigger
//! each other: pull writes through `BookingRepository::set_times` and the
//! link write after a push goes through `set_google_event_id`, both narrow
//! updates outside the hook path.
//!
//! Authority split: once a booking is linked, date/start/end belong to the
//! calendar; performer, activation and everything else stay local and are
//! never written by pull.

use std::sync::Arc;

use serde::Serialize;

use crate::db::models::{BookingDetail, Venue};
use crate::db::BookingRepository;
use crate::services::projector;
use crate::AppState;

/// Caller-visible outcome of a pull run.
#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub updated: usize,
    pub messages: Vec<String>,
}

impl SyncReport {
    fn merge(&mut self, other: SyncReport) {
        self.updated += other.updated;
        self.messages.extend(other.messages);
    }
}

/// Single source of truth for which calendar a booking belongs to:
/// the venue's own calendar when configured, else the default.
pub fn resolve_calendar_id<'a>(
    venue_calendar_id: Option<&'a str>,
    default_calendar_id: &'a str,
) -> &'a str {
    match venue_calendar_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => default_calendar_id,
    }
}

pub struct CalendarSync;

impl CalendarSync {
    /// Post-commit hook for a newly created booking: push it out and store
    /// the returned event id via the narrow link write. Returns whether the
    /// push succeeded; failure is logged, never propagated — the local row
    /// is already durable and the link self-heals on the next edit.
    pub async fn booking_created(state: &Arc<AppState>, detail: &BookingDetail) -> bool {
        let Some(transport) = state.calendar.as_ref() else {
            tracing::debug!(
                "Calendar service not configured; skipping push for booking {}",
                detail.id
            );
            return false;
        };

        let calendar_id = resolve_calendar_id(
            detail.venue_google_calendar_id.as_deref(),
            &state.config.google.default_calendar_id,
        );
        let body = projector::event_body(detail, &state.config.google.timezone);

        match transport.insert(calendar_id, &body).await {
            Ok(event_id) => {
                tracing::info!(
                    "Created Google Calendar event {} on calendar {} for booking {}",
                    event_id,
                    calendar_id,
                    detail.id
                );
                if let Err(e) =
                    BookingRepository::set_google_event_id(&state.db, &detail.id, &event_id).await
                {
                    tracing::warn!(
                        "Failed to store event id {} on booking {}: {:?}",
                        event_id,
                        detail.id,
                        e
                    );
                    return false;
                }
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to create Google Calendar event for booking {} on calendar {}: {:?}",
                    detail.id,
                    calendar_id,
                    e
                );
                false
            }
        }
    }

    /// Post-commit hook for an edited booking. A missing link means the
    /// original create push failed, so this degrades to create-and-link.
    pub async fn booking_saved(state: &Arc<AppState>, detail: &BookingDetail) -> bool {
        let Some(event_id) = detail.google_event_id.as_deref() else {
            return Self::booking_created(state, detail).await;
        };

        let Some(transport) = state.calendar.as_ref() else {
            tracing::debug!(
                "Calendar service not configured; skipping push for booking {}",
                detail.id
            );
            return false;
        };

        let calendar_id = resolve_calendar_id(
            detail.venue_google_calendar_id.as_deref(),
            &state.config.google.default_calendar_id,
        );
        let body = projector::event_body(detail, &state.config.google.timezone);

        match transport.update(calendar_id, event_id, &body).await {
            Ok(_) => {
                tracing::info!(
                    "Updated Google Calendar event {} on calendar {} for booking {}",
                    event_id,
                    calendar_id,
                    detail.id
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to update Google Calendar event {} on calendar {}: {:?}",
                    event_id,
                    calendar_id,
                    e
                );
                false
            }
        }
    }

    /// Post-delete hook. `detail` is the pre-delete snapshot: the venue and
    /// event id are no longer reachable through the booking row.
    pub async fn booking_deleted(state: &Arc<AppState>, detail: &BookingDetail) {
        let Some(event_id) = detail.google_event_id.as_deref() else {
            return;
        };
        let Some(transport) = state.calendar.as_ref() else {
            return;
        };

        let calendar_id = resolve_calendar_id(
            detail.venue_google_calendar_id.as_deref(),
            &state.config.google.default_calendar_id,
        );

        match transport.delete(calendar_id, event_id).await {
            Ok(()) => tracing::info!(
                "Deleted Google Calendar event {} from calendar {}",
                event_id,
                calendar_id
            ),
            Err(e) => tracing::warn!(
                "Failed to delete Google Calendar event {} from calendar {}: {:?}",
                event_id,
                calendar_id,
                e
            ),
        }
    }

    /// Pull externally-made time changes into local bookings, across every
    /// venue that has a calendar. A failing venue contributes an empty
    /// result and never aborts the run.
    pub async fn pull_all(state: &Arc<AppState>) -> SyncReport {
        let venues = match crate::db::VenueRepository::find_with_calendar(&state.db).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Failed to list venues for calendar pull: {:?}", e);
                return SyncReport::default();
            }
        };

        let mut report = SyncReport::default();
        for venue in venues {
            report.merge(Self::pull_venue(state, &venue).await);
        }
        report
    }

    /// Reconcile one venue's calendar. Only date/start/end are ever written
    /// back, and only through the hook-bypassing `set_times` path.
    pub async fn pull_venue(state: &Arc<AppState>, venue: &Venue) -> SyncReport {
        let mut report = SyncReport::default();

        let Some(transport) = state.calendar.as_ref() else {
            tracing::debug!("Calendar service not configured; pull is a no-op");
            return report;
        };
        if !venue.sync_enabled() {
            return report;
        }
        let calendar_id = venue
            .google_calendar_id
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();

        tracing::info!(
            "Pulling calendar {} for venue {}",
            calendar_id,
            venue.name
        );

        let events = match transport
            .list_upcoming(calendar_id, state.config.sync.max_results)
            .await
        {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(
                    "Failed to list events for venue {} (calendar {}): {:?}",
                    venue.name,
                    calendar_id,
                    e
                );
                return report;
            }
        };

        for event in events {
            if event.id.is_empty() {
                continue;
            }
            let (Some(start), Some(end)) = (event.start.as_ref(), event.end.as_ref()) else {
                continue;
            };
            let Some((date, start_time, end_time)) = projector::extract_times(start, end) else {
                tracing::debug!(
                    "Skipping event {} with unusable times (all-day or malformed)",
                    event.id
                );
                continue;
            };

            let booking =
                match BookingRepository::find_by_google_event_id(&state.db, &event.id).await {
                    Ok(Some(booking)) => booking,
                    Ok(None) => {
                        // Authored directly in the calendar; external events
                        // are never imported as bookings.
                        tracing::debug!(
                            "Skipping external event {} ({:?})",
                            event.id,
                            event.summary
                        );
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!("Lookup failed for event {}: {:?}", event.id, e);
                        continue;
                    }
                };

            if booking.date == date
                && booking.start_time == start_time
                && booking.end_time == end_time
            {
                continue;
            }

            match BookingRepository::set_times(&state.db, &booking.id, date, start_time, end_time)
                .await
            {
                Ok(true) => {
                    let summary = event.summary.as_deref().unwrap_or(&event.id);
                    tracing::info!("Updating booking {} from event {}", booking.id, event.id);
                    report.updated += 1;
                    report.messages.push(format!("Updated: {}", summary));
                }
                Ok(false) => {
                    // Booking vanished between lookup and write.
                    tracing::debug!(
                        "Booking {} for event {} no longer exists; skipping",
                        booking.id,
                        event.id
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to apply times from event {} to booking {}: {:?}",
                        event.id,
                        booking.id,
                        e
                    );
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};

    use crate::config::Config;
    use crate::db::models::{CreateBooking, CreatePerformer, CreateVenue};
    use crate::db::repository::{PerformerRepository, VenueRepository};
    use crate::db::test_pool;
    use crate::error::{AppError, AppResult};
    use crate::services::google_calendar::{
        CalendarTransport, EventBody, EventPayload, EventTime,
    };

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Insert { calendar_id: String, summary: String },
        Update { calendar_id: String, event_id: String },
        Delete { calendar_id: String, event_id: String },
        List { calendar_id: String },
    }

    #[derive(Default)]
    struct RecordingTransport {
        calls: Mutex<Vec<Call>>,
        listed: Mutex<Vec<EventPayload>>,
        insert_counter: AtomicUsize,
        fail_all: bool,
    }

    impl RecordingTransport {
        fn failing() -> Self {
            Self {
                fail_all: true,
                ..Default::default()
            }
        }

        fn with_listed(events: Vec<EventPayload>) -> Self {
            Self {
                listed: Mutex::new(events),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CalendarTransport for RecordingTransport {
        async fn insert(&self, calendar_id: &str, body: &EventBody) -> AppResult<String> {
            self.calls.lock().unwrap().push(Call::Insert {
                calendar_id: calendar_id.to_string(),
                summary: body.summary.clone(),
            });
            if self.fail_all {
                return Err(AppError::GoogleApi("insert refused".to_string()));
            }
            let n = self.insert_counter.fetch_add(1, Ordering::SeqCst);
            Ok(format!("evt_{}", n + 100))
        }

        async fn update(
            &self,
            calendar_id: &str,
            event_id: &str,
            _body: &EventBody,
        ) -> AppResult<String> {
            self.calls.lock().unwrap().push(Call::Update {
                calendar_id: calendar_id.to_string(),
                event_id: event_id.to_string(),
            });
            if self.fail_all {
                return Err(AppError::GoogleApi("update refused".to_string()));
            }
            Ok(event_id.to_string())
        }

        async fn delete(&self, calendar_id: &str, event_id: &str) -> AppResult<()> {
            self.calls.lock().unwrap().push(Call::Delete {
                calendar_id: calendar_id.to_string(),
                event_id: event_id.to_string(),
            });
            if self.fail_all {
                return Err(AppError::GoogleApi("delete refused".to_string()));
            }
            Ok(())
        }

        async fn list_upcoming(
            &self,
            calendar_id: &str,
            _max_results: u32,
        ) -> AppResult<Vec<EventPayload>> {
            self.calls.lock().unwrap().push(Call::List {
                calendar_id: calendar_id.to_string(),
            });
            if self.fail_all {
                return Err(AppError::GoogleApi("list refused".to_string()));
            }
            Ok(self.listed.lock().unwrap().clone())
        }
    }

    /// Deletes a booking while serving the event list, standing in for an
    /// external delete racing the pull.
    struct VanishingTransport {
        pool: sqlx::SqlitePool,
        booking_id: String,
        events: Vec<EventPayload>,
    }

    #[async_trait]
    impl CalendarTransport for VanishingTransport {
        async fn insert(&self, _calendar_id: &str, _body: &EventBody) -> AppResult<String> {
            unreachable!("pull never inserts")
        }

        async fn update(
            &self,
            _calendar_id: &str,
            _event_id: &str,
            _body: &EventBody,
        ) -> AppResult<String> {
            unreachable!("pull never updates events")
        }

        async fn delete(&self, _calendar_id: &str, _event_id: &str) -> AppResult<()> {
            unreachable!("pull never deletes events")
        }

        async fn list_upcoming(
            &self,
            _calendar_id: &str,
            _max_results: u32,
        ) -> AppResult<Vec<EventPayload>> {
            BookingRepository::delete(&self.pool, &self.booking_id).await?;
            Ok(self.events.clone())
        }
    }

    async fn state_with(transport: Option<Arc<RecordingTransport>>) -> Arc<AppState> {
        Arc::new(AppState {
            db: test_pool().await,
            config: Config::for_tests(),
            calendar: transport.map(|t| t as Arc<dyn CalendarTransport>),
            mail: None,
        })
    }

    /// Seeds "DJ MARVIN @ QUARTER DECK" on 2025-12-05 19:00-22:00, venue
    /// calendar "cal_qd".
    async fn seed_booking(state: &Arc<AppState>) -> (Venue, BookingDetail) {
        let venue = VenueRepository::create(
            &state.db,
            CreateVenue {
                name: "QUARTER DECK".to_string(),
                address: Some("12 Harbour Rd".to_string()),
                google_calendar_id: Some("cal_qd".to_string()),
            },
        )
        .await
        .unwrap();
        let performer = PerformerRepository::create(
            &state.db,
            CreatePerformer {
                name: "DJ MARVIN".to_string(),
                genre: None,
                contact_number: None,
            },
        )
        .await
        .unwrap();
        let booking = BookingRepository::create(
            &state.db,
            CreateBooking {
                date: NaiveDate::from_ymd_opt(2025, 12, 5).unwrap(),
                start_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
                venue_id: venue.id.clone(),
                performer_id: performer.id,
                activation_id: None,
            },
        )
        .await
        .unwrap();

        let detail = BookingRepository::get_detail(&state.db, &booking.id)
            .await
            .unwrap()
            .unwrap();
        (venue, detail)
    }

    async fn detail_of(state: &Arc<AppState>, id: &str) -> BookingDetail {
        BookingRepository::get_detail(&state.db, id)
            .await
            .unwrap()
            .unwrap()
    }

    fn timed_event(id: &str, summary: &str, start: &str, end: &str) -> EventPayload {
        EventPayload {
            id: id.to_string(),
            summary: Some(summary.to_string()),
            start: Some(EventTime {
                date_time: Some(start.to_string()),
                ..Default::default()
            }),
            end: Some(EventTime {
                date_time: Some(end.to_string()),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn calendar_resolution_prefers_venue_then_default() {
        assert_eq!(resolve_calendar_id(Some("cal_qd"), "primary"), "cal_qd");
        assert_eq!(resolve_calendar_id(Some("   "), "primary"), "primary");
        assert_eq!(resolve_calendar_id(None, "primary"), "primary");
    }

    #[tokio::test]
    async fn create_push_targets_venue_calendar_and_links_the_event() {
        let transport = Arc::new(RecordingTransport::default());
        let state = state_with(Some(transport.clone())).await;
        let (_venue, detail) = seed_booking(&state).await;

        assert!(CalendarSync::booking_created(&state, &detail).await);

        assert_eq!(
            transport.calls(),
            vec![Call::Insert {
                calendar_id: "cal_qd".to_string(),
                summary: "DJ MARVIN @ QUARTER DECK".to_string(),
            }]
        );
        let linked = detail_of(&state, &detail.id).await;
        assert_eq!(linked.google_event_id.as_deref(), Some("evt_100"));
    }

    #[tokio::test]
    async fn push_failure_leaves_local_booking_intact() {
        let transport = Arc::new(RecordingTransport::failing());
        let state = state_with(Some(transport.clone())).await;
        let (_venue, detail) = seed_booking(&state).await;

        assert!(!CalendarSync::booking_created(&state, &detail).await);

        let after = detail_of(&state, &detail.id).await;
        assert!(after.google_event_id.is_none());
        assert_eq!(after.start_time, detail.start_time);
    }

    #[tokio::test]
    async fn missing_link_self_heals_on_next_edit_without_duplicates() {
        let transport = Arc::new(RecordingTransport::default());
        let state = state_with(Some(transport.clone())).await;
        let (_venue, detail) = seed_booking(&state).await;
        assert!(detail.google_event_id.is_none());

        // First edit after a failed create push: behaves as create.
        assert!(CalendarSync::booking_saved(&state, &detail).await);
        let linked = detail_of(&state, &detail.id).await;
        let event_id = linked.google_event_id.clone().expect("link established");

        // Second edit: update in place, no second insert, id unchanged.
        assert!(CalendarSync::booking_saved(&state, &linked).await);
        let after = detail_of(&state, &detail.id).await;
        assert_eq!(after.google_event_id, Some(event_id.clone()));

        let calls = transport.calls();
        let inserts = calls
            .iter()
            .filter(|c| matches!(c, Call::Insert { .. }))
            .count();
        assert_eq!(inserts, 1);
        assert_eq!(
            calls.last(),
            Some(&Call::Update {
                calendar_id: "cal_qd".to_string(),
                event_id,
            })
        );
    }

    #[tokio::test]
    async fn repeated_saves_issue_one_update_each() {
        let transport = Arc::new(RecordingTransport::default());
        let state = state_with(Some(transport.clone())).await;
        let (_venue, detail) = seed_booking(&state).await;
        BookingRepository::set_google_event_id(&state.db, &detail.id, "evt_9")
            .await
            .unwrap();
        let detail = detail_of(&state, &detail.id).await;

        assert!(CalendarSync::booking_saved(&state, &detail).await);
        assert!(CalendarSync::booking_saved(&state, &detail).await);

        let updates: Vec<_> = transport
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Update { .. }))
            .collect();
        assert_eq!(updates.len(), 2);
        let after = detail_of(&state, &detail.id).await;
        assert_eq!(after.google_event_id.as_deref(), Some("evt_9"));
    }

    #[tokio::test]
    async fn delete_push_uses_pre_delete_snapshot() {
        let transport = Arc::new(RecordingTransport::default());
        let state = state_with(Some(transport.clone())).await;
        let (_venue, detail) = seed_booking(&state).await;
        BookingRepository::set_google_event_id(&state.db, &detail.id, "evt_7")
            .await
            .unwrap();
        let snapshot = detail_of(&state, &detail.id).await;

        BookingRepository::delete(&state.db, &detail.id).await.unwrap();
        CalendarSync::booking_deleted(&state, &snapshot).await;

        assert_eq!(
            transport.calls(),
            vec![Call::Delete {
                calendar_id: "cal_qd".to_string(),
                event_id: "evt_7".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn unlinked_delete_makes_no_transport_call() {
        let transport = Arc::new(RecordingTransport::default());
        let state = state_with(Some(transport.clone())).await;
        let (_venue, detail) = seed_booking(&state).await;

        CalendarSync::booking_deleted(&state, &detail).await;
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn pull_updates_times_and_nothing_else() {
        let transport = Arc::new(RecordingTransport::with_listed(vec![timed_event(
            "evt_123",
            "DJ MARVIN @ QUARTER DECK",
            "2025-12-05T20:00:00+02:00",
            "2025-12-05T22:00:00+02:00",
        )]));
        let state = state_with(Some(transport.clone())).await;
        let (venue, detail) = seed_booking(&state).await;
        BookingRepository::set_google_event_id(&state.db, &detail.id, "evt_123")
            .await
            .unwrap();

        let report = CalendarSync::pull_venue(&state, &venue).await;

        assert_eq!(report.updated, 1);
        assert_eq!(report.messages, vec!["Updated: DJ MARVIN @ QUARTER DECK"]);

        let after = detail_of(&state, &detail.id).await;
        assert_eq!(after.start_time, NaiveTime::from_hms_opt(20, 0, 0).unwrap());
        assert_eq!(after.end_time, NaiveTime::from_hms_opt(22, 0, 0).unwrap());
        // Local-authoritative fields untouched.
        assert_eq!(after.performer_name, "DJ MARVIN");
        assert_eq!(after.google_event_id.as_deref(), Some("evt_123"));
    }

    #[tokio::test]
    async fn pull_never_triggers_outbound_calls() {
        let transport = Arc::new(RecordingTransport::with_listed(vec![timed_event(
            "evt_123",
            "DJ MARVIN @ QUARTER DECK",
            "2025-12-06T21:00:00",
            "2025-12-06T23:30:00",
        )]));
        let state = state_with(Some(transport.clone())).await;
        let (venue, detail) = seed_booking(&state).await;
        BookingRepository::set_google_event_id(&state.db, &detail.id, "evt_123")
            .await
            .unwrap();

        let report = CalendarSync::pull_venue(&state, &venue).await;
        assert_eq!(report.updated, 1);

        // The only transport traffic from a pull is the list itself.
        assert_eq!(
            transport.calls(),
            vec![Call::List {
                calendar_id: "cal_qd".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn unmapped_external_events_are_skipped() {
        let transport = Arc::new(RecordingTransport::with_listed(vec![timed_event(
            "evt_unknown",
            "Private party",
            "2025-12-06T21:00:00",
            "2025-12-06T23:00:00",
        )]));
        let state = state_with(Some(transport.clone())).await;
        let (venue, detail) = seed_booking(&state).await;

        let report = CalendarSync::pull_venue(&state, &venue).await;

        assert_eq!(report.updated, 0);
        assert!(report.messages.is_empty());
        let after = detail_of(&state, &detail.id).await;
        assert_eq!(after.start_time, detail.start_time);
        assert!(after.google_event_id.is_none());
    }

    #[tokio::test]
    async fn matching_times_produce_no_update() {
        let transport = Arc::new(RecordingTransport::with_listed(vec![timed_event(
            "evt_123",
            "DJ MARVIN @ QUARTER DECK",
            "2025-12-05T19:00:00",
            "2025-12-05T22:00:00",
        )]));
        let state = state_with(Some(transport.clone())).await;
        let (venue, detail) = seed_booking(&state).await;
        BookingRepository::set_google_event_id(&state.db, &detail.id, "evt_123")
            .await
            .unwrap();

        let report = CalendarSync::pull_venue(&state, &venue).await;
        assert_eq!(report.updated, 0);
        assert!(report.messages.is_empty());
    }

    #[tokio::test]
    async fn all_day_and_malformed_events_do_not_abort_the_batch() {
        let all_day = EventPayload {
            id: "evt_allday".to_string(),
            summary: Some("Maintenance".to_string()),
            start: Some(EventTime {
                date: Some("2025-12-06".to_string()),
                ..Default::default()
            }),
            end: Some(EventTime {
                date: Some("2025-12-07".to_string()),
                ..Default::default()
            }),
        };
        let no_times = EventPayload {
            id: "evt_empty".to_string(),
            ..Default::default()
        };
        let good = timed_event(
            "evt_123",
            "DJ MARVIN @ QUARTER DECK",
            "2025-12-05T20:30:00",
            "2025-12-05T23:00:00",
        );
        let transport = Arc::new(RecordingTransport::with_listed(vec![
            all_day, no_times, good,
        ]));
        let state = state_with(Some(transport)).await;
        let (venue, detail) = seed_booking(&state).await;
        BookingRepository::set_google_event_id(&state.db, &detail.id, "evt_123")
            .await
            .unwrap();

        let report = CalendarSync::pull_venue(&state, &venue).await;
        assert_eq!(report.updated, 1);
    }

    #[tokio::test]
    async fn booking_deleted_mid_pull_is_not_reported_as_updated() {
        let bootstrap = state_with(None).await;
        let (venue, detail) = seed_booking(&bootstrap).await;
        BookingRepository::set_google_event_id(&bootstrap.db, &detail.id, "evt_123")
            .await
            .unwrap();

        let transport = Arc::new(VanishingTransport {
            pool: bootstrap.db.clone(),
            booking_id: detail.id.clone(),
            events: vec![timed_event(
                "evt_123",
                "DJ MARVIN @ QUARTER DECK",
                "2025-12-05T20:00:00",
                "2025-12-05T22:00:00",
            )],
        });
        let state = Arc::new(AppState {
            db: bootstrap.db.clone(),
            config: Config::for_tests(),
            calendar: Some(transport as Arc<dyn CalendarTransport>),
            mail: None,
        });

        let report = CalendarSync::pull_venue(&state, &venue).await;
        assert_eq!(report.updated, 0);
        assert!(report.messages.is_empty());
    }

    #[tokio::test]
    async fn venue_transport_failure_yields_empty_report() {
        let transport = Arc::new(RecordingTransport::failing());
        let state = state_with(Some(transport)).await;
        let (venue, _detail) = seed_booking(&state).await;

        let report = CalendarSync::pull_venue(&state, &venue).await;
        assert_eq!(report.updated, 0);
        assert!(report.messages.is_empty());
    }

    #[tokio::test]
    async fn no_transport_means_push_noop_and_empty_pull() {
        let state = state_with(None).await;
        let (_venue, detail) = seed_booking(&state).await;

        assert!(!CalendarSync::booking_created(&state, &detail).await);
        let after = detail_of(&state, &detail.id).await;
        assert!(after.google_event_id.is_none());

        let report = CalendarSync::pull_all(&state).await;
        assert_eq!(report.updated, 0);
    }

    #[tokio::test]
    async fn pull_all_covers_only_venues_with_calendars() {
        let transport = Arc::new(RecordingTransport::default());
        let state = state_with(Some(transport.clone())).await;
        let (_venue, _detail) = seed_booking(&state).await;
        VenueRepository::create(
            &state.db,
            CreateVenue {
                name: "Back Bar".to_string(),
                address: None,
                google_calendar_id: None,
            },
        )
        .await
        .unwrap();

        CalendarSync::pull_all(&state).await;

        assert_eq!(
            transport.calls(),
            vec![Call::List {
                calendar_id: "cal_qd".to_string()
            }]
        );
    }

    /// End-to-end: push links the booking, then an external time edit flows
    /// back in while everything local-authoritative stays put.
    #[tokio::test]
    async fn push_then_external_edit_then_pull_scenario() {
        let transport = Arc::new(RecordingTransport::default());
        let state = state_with(Some(transport.clone())).await;
        let (venue, detail) = seed_booking(&state).await;

        assert!(CalendarSync::booking_created(&state, &detail).await);
        let linked = detail_of(&state, &detail.id).await;
        let event_id = linked.google_event_id.clone().unwrap();

        // Someone drags the event an hour later in the Google UI.
        *transport.listed.lock().unwrap() = vec![timed_event(
            &event_id,
            "DJ MARVIN @ QUARTER DECK",
            "2025-12-05T20:00:00+02:00",
            "2025-12-05T22:00:00+02:00",
        )];

        let report = CalendarSync::pull_all(&state).await;
        assert_eq!(report.updated, 1);

        let after = detail_of(&state, &detail.id).await;
        assert_eq!(after.date, NaiveDate::from_ymd_opt(2025, 12, 5).unwrap());
        assert_eq!(after.start_time, NaiveTime::from_hms_opt(20, 0, 0).unwrap());
        assert_eq!(after.end_time, NaiveTime::from_hms_opt(22, 0, 0).unwrap());
        assert_eq!(after.performer_name, "DJ MARVIN");
        assert_eq!(after.venue_name, venue.name);

        // And the pull produced no outbound traffic beyond the insert that
        // linked the booking in the first place.
        let calls = transport.calls();
        assert_eq!(
            calls
                .iter()
                .filter(|c| matches!(c, Call::Update { .. } | Call::Insert { .. }))
                .count(),
            1
        );
    }
}
