use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{CreatePerformer, Performer};
use crate::error::AppResult;

/// Repository for the `performers` table.
pub struct PerformerRepository;

impl PerformerRepository {
    pub async fn create(pool: &SqlitePool, create: CreatePerformer) -> AppResult<Performer> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        let performer = sqlx::query_as::<_, Performer>(
            r#"
            INSERT INTO performers (id, name, genre, contact_number, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&create.name)
        .bind(&create.genre)
        .bind(&create.contact_number)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(performer)
    }

    pub async fn get(pool: &SqlitePool, id: &str) -> AppResult<Option<Performer>> {
        let performer = sqlx::query_as::<_, Performer>("SELECT * FROM performers WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(performer)
    }

    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<Performer>> {
        let performers = sqlx::query_as::<_, Performer>("SELECT * FROM performers ORDER BY name")
            .fetch_all(pool)
            .await?;
        Ok(performers)
    }
}
