use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{CreateVenue, Venue};
use crate::error::{AppError, AppResult};

/// Repository for the `venues` table.
pub struct VenueRepository;

impl VenueRepository {
    pub async fn create(pool: &SqlitePool, create: CreateVenue) -> AppResult<Venue> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        let venue = sqlx::query_as::<_, Venue>(
            r#"
            INSERT INTO venues (id, name, address, google_calendar_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&create.name)
        .bind(&create.address)
        .bind(&create.google_calendar_id)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(venue)
    }

    pub async fn get(pool: &SqlitePool, id: &str) -> AppResult<Option<Venue>> {
        let venue = sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(venue)
    }

    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<Venue>> {
        let venues = sqlx::query_as::<_, Venue>("SELECT * FROM venues ORDER BY name")
            .fetch_all(pool)
            .await?;
        Ok(venues)
    }

    /// Venues that participate in calendar sync (non-blank calendar id).
    pub async fn find_with_calendar(pool: &SqlitePool) -> AppResult<Vec<Venue>> {
        let venues = sqlx::query_as::<_, Venue>(
            r#"
            SELECT * FROM venues
            WHERE google_calendar_id IS NOT NULL AND TRIM(google_calendar_id) != ''
            ORDER BY name
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(venues)
    }

    pub async fn set_google_calendar_id(
        pool: &SqlitePool,
        id: &str,
        google_calendar_id: Option<&str>,
    ) -> AppResult<Venue> {
        let now = Utc::now().naive_utc();

        sqlx::query_as::<_, Venue>(
            r#"
            UPDATE venues SET google_calendar_id = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(google_calendar_id)
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Venue {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn blank_calendar_id_counts_as_disabled() {
        let pool = test_pool().await;
        for (name, cal) in [
            ("No calendar", None),
            ("Blank calendar", Some("   ".to_string())),
            ("Synced", Some("cal_1".to_string())),
        ] {
            VenueRepository::create(
                &pool,
                CreateVenue {
                    name: name.to_string(),
                    address: None,
                    google_calendar_id: cal,
                },
            )
            .await
            .unwrap();
        }

        let synced = VenueRepository::find_with_calendar(&pool).await.unwrap();
        assert_eq!(synced.len(), 1);
        assert_eq!(synced[0].name, "Synced");
        assert!(synced[0].sync_enabled());
    }
}
