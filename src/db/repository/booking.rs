use chrono::{NaiveDate, NaiveTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{Booking, BookingDetail, CreateBooking, UpdateBooking};
use crate::error::{AppError, AppResult};

const DETAIL_QUERY: &str = r#"
    SELECT
        b.id,
        b.date,
        b.start_time,
        b.end_time,
        b.google_event_id,
        b.venue_id,
        v.name AS venue_name,
        v.address AS venue_address,
        v.google_calendar_id AS venue_google_calendar_id,
        p.name AS performer_name,
        p.contact_number AS performer_contact_number,
        a.name AS activation_name
    FROM bookings b
    JOIN venues v ON v.id = b.venue_id
    JOIN performers p ON p.id = b.performer_id
    LEFT JOIN activations a ON a.id = b.activation_id
"#;

/// Repository for the `bookings` table.
///
/// Besides the usual CRUD this carries two deliberately narrow update
/// paths: `set_google_event_id` (link write after a push) and `set_times`
/// (inbound time write during pull). Both touch only their own columns and
/// are never routed through the push hooks, which is what keeps the
/// push/pull pair from re-triggering each other.
pub struct BookingRepository;

impl BookingRepository {
    pub async fn create(pool: &SqlitePool, create: CreateBooking) -> AppResult<Booking> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                id, date, start_time, end_time, venue_id, performer_id,
                activation_id, google_event_id, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, NULL, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(create.date)
        .bind(create.start_time)
        .bind(create.end_time)
        .bind(&create.venue_id)
        .bind(&create.performer_id)
        .bind(&create.activation_id)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(booking)
    }

    /// Full-field update through the normal mutation path. Callers are
    /// expected to invoke the outbound push hook after this commits.
    pub async fn update(pool: &SqlitePool, id: &str, update: UpdateBooking) -> AppResult<Booking> {
        let now = Utc::now().naive_utc();

        sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET date = ?, start_time = ?, end_time = ?, venue_id = ?,
                performer_id = ?, activation_id = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(update.date)
        .bind(update.start_time)
        .bind(update.end_time)
        .bind(&update.venue_id)
        .bind(&update.performer_id)
        .bind(&update.activation_id)
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Booking {} not found", id)));
        }
        Ok(())
    }

    pub async fn get(pool: &SqlitePool, id: &str) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(booking)
    }

    /// Schedule order: date, then start time.
    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<Booking>> {
        let bookings =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY date, start_time")
                .fetch_all(pool)
                .await?;
        Ok(bookings)
    }

    /// Identity mapping: resolve the local booking that owns an external
    /// calendar event. `None` is an expected outcome during pull (the event
    /// was authored directly in the calendar).
    pub async fn find_by_google_event_id(
        pool: &SqlitePool,
        google_event_id: &str,
    ) -> AppResult<Option<Booking>> {
        let booking =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE google_event_id = ?")
                .bind(google_event_id)
                .fetch_optional(pool)
                .await?;
        Ok(booking)
    }

    /// Narrow link write: stores the external event id and nothing else, so
    /// a concurrent edit to the booking's other fields cannot be clobbered.
    pub async fn set_google_event_id(
        pool: &SqlitePool,
        id: &str,
        google_event_id: &str,
    ) -> AppResult<()> {
        sqlx::query("UPDATE bookings SET google_event_id = ? WHERE id = ?")
            .bind(google_event_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Narrow inbound write used by pull: only the calendar-authoritative
    /// columns (date, start, end) change; performer, activation and the
    /// event link are untouched. Returns `false` when the booking no longer
    /// exists, which pull treats as a skip rather than an applied update.
    pub async fn set_times(
        pool: &SqlitePool,
        id: &str,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE bookings SET date = ?, start_time = ?, end_time = ? WHERE id = ?")
                .bind(date)
                .bind(start_time)
                .bind(end_time)
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Joined read model for the projector and push paths.
    pub async fn get_detail(pool: &SqlitePool, id: &str) -> AppResult<Option<BookingDetail>> {
        let query = format!("{} WHERE b.id = ?", DETAIL_QUERY);
        let detail = sqlx::query_as::<_, BookingDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(detail)
    }

    /// Number of bookings currently linked to an external event.
    pub async fn count_linked(pool: &SqlitePool) -> AppResult<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE google_event_id IS NOT NULL")
                .fetch_one(pool)
                .await?;
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{CreatePerformer, CreateVenue};
    use crate::db::repository::{PerformerRepository, VenueRepository};
    use crate::db::test_pool;

    async fn seed_booking(pool: &SqlitePool) -> Booking {
        let venue = VenueRepository::create(
            pool,
            CreateVenue {
                name: "Quarter Deck".to_string(),
                address: Some("12 Harbour Rd".to_string()),
                google_calendar_id: Some("cal_qd".to_string()),
            },
        )
        .await
        .unwrap();
        let performer = PerformerRepository::create(
            pool,
            CreatePerformer {
                name: "DJ Marvin".to_string(),
                genre: None,
                contact_number: Some("555-0101".to_string()),
            },
        )
        .await
        .unwrap();

        BookingRepository::create(
            pool,
            CreateBooking {
                date: NaiveDate::from_ymd_opt(2025, 12, 5).unwrap(),
                start_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
                venue_id: venue.id,
                performer_id: performer.id,
                activation_id: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_and_lookup_by_google_event_id() {
        let pool = test_pool().await;
        let booking = seed_booking(&pool).await;
        assert!(booking.google_event_id.is_none());

        BookingRepository::set_google_event_id(&pool, &booking.id, "evt_123")
            .await
            .unwrap();

        let found = BookingRepository::find_by_google_event_id(&pool, "evt_123")
            .await
            .unwrap()
            .expect("linked booking");
        assert_eq!(found.id, booking.id);
        assert_eq!(BookingRepository::count_linked(&pool).await.unwrap(), 1);

        let missing = BookingRepository::find_by_google_event_id(&pool, "evt_unknown")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn set_times_leaves_other_fields_alone() {
        let pool = test_pool().await;
        let booking = seed_booking(&pool).await;
        BookingRepository::set_google_event_id(&pool, &booking.id, "evt_1")
            .await
            .unwrap();

        let changed = BookingRepository::set_times(
            &pool,
            &booking.id,
            NaiveDate::from_ymd_opt(2025, 12, 6).unwrap(),
            NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
        )
        .await
        .unwrap();
        assert!(changed);

        let updated = BookingRepository::get(&pool, &booking.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.date, NaiveDate::from_ymd_opt(2025, 12, 6).unwrap());
        assert_eq!(
            updated.start_time,
            NaiveTime::from_hms_opt(20, 0, 0).unwrap()
        );
        assert_eq!(updated.performer_id, booking.performer_id);
        assert_eq!(updated.google_event_id.as_deref(), Some("evt_1"));
    }

    #[tokio::test]
    async fn set_times_on_missing_booking_changes_nothing() {
        let pool = test_pool().await;
        seed_booking(&pool).await;

        let changed = BookingRepository::set_times(
            &pool,
            "no-such-booking",
            NaiveDate::from_ymd_opt(2025, 12, 6).unwrap(),
            NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
        )
        .await
        .unwrap();
        assert!(!changed);
    }

    #[tokio::test]
    async fn detail_joins_venue_and_performer() {
        let pool = test_pool().await;
        let booking = seed_booking(&pool).await;

        let detail = BookingRepository::get_detail(&pool, &booking.id)
            .await
            .unwrap()
            .expect("detail");
        assert_eq!(detail.venue_name, "Quarter Deck");
        assert_eq!(detail.performer_name, "DJ Marvin");
        assert_eq!(detail.venue_google_calendar_id.as_deref(), Some("cal_qd"));
        assert_eq!(detail.activation_name, None);
    }

    #[tokio::test]
    async fn cross_midnight_times_survive_storage() {
        let pool = test_pool().await;
        let booking = seed_booking(&pool).await;

        let update = UpdateBooking {
            date: booking.date,
            start_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(2, 0, 0).unwrap(),
            venue_id: booking.venue_id.clone(),
            performer_id: booking.performer_id.clone(),
            activation_id: None,
        };
        let updated = BookingRepository::update(&pool, &booking.id, update)
            .await
            .unwrap();
        assert!(updated.end_time < updated.start_time);
    }
}
