use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Activation type, e.g. a brand campaign or themed night a booking runs under.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Activation {
    pub id: String,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActivation {
    pub name: String,
}
