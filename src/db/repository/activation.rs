use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{Activation, CreateActivation};
use crate::error::AppResult;

/// Repository for the `activations` table.
pub struct ActivationRepository;

impl ActivationRepository {
    pub async fn create(pool: &SqlitePool, create: CreateActivation) -> AppResult<Activation> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        let activation = sqlx::query_as::<_, Activation>(
            r#"
            INSERT INTO activations (id, name, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&create.name)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(activation)
    }

    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<Activation>> {
        let activations = sqlx::query_as::<_, Activation>("SELECT * FROM activations ORDER BY name")
            .fetch_all(pool)
            .await?;
        Ok(activations)
    }
}
