use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{ContactMessage, CreateContactMessage};
use crate::error::AppResult;

/// Repository for the `contact_messages` table.
pub struct ContactMessageRepository;

impl ContactMessageRepository {
    pub async fn create(
        pool: &SqlitePool,
        create: CreateContactMessage,
    ) -> AppResult<ContactMessage> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        let message = sqlx::query_as::<_, ContactMessage>(
            r#"
            INSERT INTO contact_messages (id, name, email, message, is_read, replied_to, created_at)
            VALUES (?, ?, ?, ?, 0, 0, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&create.name)
        .bind(&create.email)
        .bind(&create.message)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(message)
    }

    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<ContactMessage>> {
        let messages = sqlx::query_as::<_, ContactMessage>(
            "SELECT * FROM contact_messages ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await?;
        Ok(messages)
    }
}
