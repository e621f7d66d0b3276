use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Performer {
    pub id: String,
    pub name: String,
    pub genre: Option<String>,
    pub contact_number: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePerformer {
    pub name: String,
    pub genre: Option<String>,
    pub contact_number: Option<String>,
}
