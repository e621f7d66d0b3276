use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    /// Google Calendar ID this venue mirrors to. NULL or blank means
    /// calendar sync is disabled for the venue.
    pub google_calendar_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Venue {
    /// Whether this venue participates in calendar sync.
    pub fn sync_enabled(&self) -> bool {
        self.google_calendar_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVenue {
    pub name: String,
    pub address: Option<String>,
    pub google_calendar_id: Option<String>,
}
