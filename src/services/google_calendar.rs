use std::path::Path;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};

const GOOGLE_API_URL: &str = "https://www.googleapis.com/calendar/v3";
const GOOGLE_CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const REQUEST_TIMEOUT_SECONDS: u64 = 10;

// ============================================================================
// Wire Types (Google Calendar v3)
// ============================================================================

/// `start`/`end` sub-object of an event. Timed events carry `dateTime`,
/// all-day events carry only `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// Event body sent on insert/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBody {
    pub summary: String,
    pub location: String,
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
}

/// Event as returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EventPayload {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start: Option<EventTime>,
    #[serde(default)]
    pub end: Option<EventTime>,
}

#[derive(Debug, Deserialize)]
struct EventsListResponse {
    #[serde(default)]
    items: Vec<EventPayload>,
}

#[derive(Debug, Deserialize)]
struct InsertedEvent {
    id: String,
}

// ============================================================================
// Transport Seam
// ============================================================================

/// Thin contract over the external calendar API. Push and pull depend on
/// this trait, never on the concrete Google client, so tests can record
/// calls instead of going over the wire.
#[async_trait]
pub trait CalendarTransport: Send + Sync {
    /// Create an event; returns the external event id.
    async fn insert(&self, calendar_id: &str, body: &EventBody) -> AppResult<String>;

    /// Replace an existing event; returns the (unchanged) external event id.
    async fn update(&self, calendar_id: &str, event_id: &str, body: &EventBody)
        -> AppResult<String>;

    async fn delete(&self, calendar_id: &str, event_id: &str) -> AppResult<()>;

    /// Upcoming single-instance events ordered by start time, window
    /// starting now.
    async fn list_upcoming(
        &self,
        calendar_id: &str,
        max_results: u32,
    ) -> AppResult<Vec<EventPayload>>;
}

// ============================================================================
// Service-Account Auth
// ============================================================================

/// Relevant fields of a Google service-account JSON key file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    expires_at: chrono::DateTime<Utc>,
}

// ============================================================================
// Google Client
// ============================================================================

/// Google Calendar v3 client authenticated via a service-account JWT grant.
/// The bearer token is cached and refreshed shortly before expiry.
pub struct GoogleCalendarService {
    client: Client,
    api_url: String,
    key: ServiceAccountKey,
    access_token: RwLock<Option<AccessToken>>,
}

impl GoogleCalendarService {
    /// Load the service-account key file. Returns `Ok(None)` when the file
    /// does not exist: calendar sync is then disabled rather than fatal.
    pub fn from_key_file(path: &str) -> AppResult<Option<Self>> {
        if !Path::new(path).exists() {
            tracing::warn!(
                "Service account file not found at {}. Google Calendar sync will be skipped.",
                path
            );
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read {}: {}", path, e)))?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|e| AppError::Config(format!("Invalid service account key {}: {}", path, e)))?;

        Ok(Some(Self::new(key, GOOGLE_API_URL.to_string())))
    }

    pub fn new(key: ServiceAccountKey, api_url: String) -> Self {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            api_url,
            key,
            access_token: RwLock::new(None),
        }
    }

    /// Return a valid bearer token, going through the JWT grant when the
    /// cached one is missing or about to expire.
    async fn access_token(&self) -> AppResult<String> {
        {
            let cached = self.access_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > Utc::now() + Duration::seconds(60) {
                    return Ok(token.token.clone());
                }
            }
        }

        let now = Utc::now();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: GOOGLE_CALENDAR_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let encoding_key = jsonwebtoken::EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| AppError::Config(format!("Invalid service account private key: {}", e)))?;
        let assertion = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256),
            &claims,
            &encoding_key,
        )
        .map_err(|e| AppError::Config(format!("Failed to sign service account JWT: {}", e)))?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GoogleApi(format!(
                "Token exchange failed: {} {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        let access = AccessToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        };
        let bearer = access.token.clone();
        *self.access_token.write().await = Some(access);

        Ok(bearer)
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.api_url,
            urlencoding::encode(calendar_id)
        )
    }

    fn event_url(&self, calendar_id: &str, event_id: &str) -> String {
        format!(
            "{}/{}",
            self.events_url(calendar_id),
            urlencoding::encode(event_id)
        )
    }

    async fn check_status(
        response: reqwest::Response,
        operation: &str,
        calendar_id: &str,
    ) -> AppResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::GoogleApi(format!(
            "{} failed on calendar {}: {} {}",
            operation, calendar_id, status, body
        )))
    }
}

#[async_trait]
impl CalendarTransport for GoogleCalendarService {
    async fn insert(&self, calendar_id: &str, body: &EventBody) -> AppResult<String> {
        let token = self.access_token().await?;
        let response = self
            .client
            .post(self.events_url(calendar_id))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        let response = Self::check_status(response, "insert", calendar_id).await?;
        let event: InsertedEvent = response.json().await?;
        Ok(event.id)
    }

    async fn update(
        &self,
        calendar_id: &str,
        event_id: &str,
        body: &EventBody,
    ) -> AppResult<String> {
        let token = self.access_token().await?;
        let response = self
            .client
            .put(self.event_url(calendar_id, event_id))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        let response = Self::check_status(response, "update", calendar_id).await?;
        let event: InsertedEvent = response.json().await?;
        Ok(event.id)
    }

    async fn delete(&self, calendar_id: &str, event_id: &str) -> AppResult<()> {
        let token = self.access_token().await?;
        let response = self
            .client
            .delete(self.event_url(calendar_id, event_id))
            .bearer_auth(token)
            .send()
            .await?;

        // Already deleted on the remote side is as good as deleted.
        if response.status() == reqwest::StatusCode::NOT_FOUND
            || response.status() == reqwest::StatusCode::GONE
        {
            tracing::debug!(
                "Event {} already absent from calendar {}",
                event_id,
                calendar_id
            );
            return Ok(());
        }

        Self::check_status(response, "delete", calendar_id).await?;
        Ok(())
    }

    async fn list_upcoming(
        &self,
        calendar_id: &str,
        max_results: u32,
    ) -> AppResult<Vec<EventPayload>> {
        let token = self.access_token().await?;
        let time_min = Utc::now().to_rfc3339();
        let response = self
            .client
            .get(self.events_url(calendar_id))
            .bearer_auth(token)
            .query(&[
                ("maxResults", max_results.to_string().as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("timeMin", time_min.as_str()),
            ])
            .send()
            .await?;
        let response = Self::check_status(response, "list", calendar_id).await?;
        let list: EventsListResponse = response.json().await?;
        Ok(list.items)
    }
}
