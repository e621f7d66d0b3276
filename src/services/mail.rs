//! Outbound email through an HTTP mail provider.
//!
//! Entirely optional: without a configured endpoint the service is never
//! constructed and every caller treats `None` as "nothing to send". Sending
//! is best-effort; failures are logged by the callers, not raised to users.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;

use crate::config::MailConfig;
use crate::db::models::{BookingDetail, ContactMessage};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct MailService {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    from_address: String,
    notify_addresses: Vec<String>,
}

impl MailService {
    /// Build from config, or `None` when no endpoint is configured.
    pub fn from_config(config: &MailConfig) -> Option<Self> {
        let api_url = config.api_url.clone()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");

        Some(Self {
            client,
            api_url,
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
            notify_addresses: config.notify_addresses.clone(),
        })
    }

    pub async fn send(&self, to: &[String], subject: &str, text: &str) -> AppResult<()> {
        if to.is_empty() {
            tracing::debug!("No recipients configured; dropping mail '{}'", subject);
            return Ok(());
        }

        let mut request = self.client.post(&self.api_url).json(&json!({
            "from": self.from_address,
            "to": to,
            "subject": subject,
            "text": text,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ServiceUnavailable(format!(
                "Mail provider rejected '{}': {} {}",
                subject, status, body
            )));
        }
        Ok(())
    }

    /// Notify stakeholders that a booking reached the shared calendar.
    /// Called on explicit request after a successful push.
    pub async fn send_booking_confirmation(&self, detail: &BookingDetail) -> AppResult<()> {
        let subject = format!(
            "Booking confirmed: {} @ {}",
            detail.performer_name, detail.venue_name
        );
        let text = format!(
            "{} plays {} on {} from {} to {}.\nThe shared calendar has been updated.",
            detail.performer_name,
            detail.venue_name,
            detail.date,
            detail.start_time.format("%H:%M"),
            detail.end_time.format("%H:%M"),
        );
        self.send(&self.notify_addresses, &subject, &text).await
    }

    /// Forward a stored contact-form message to the stakeholders.
    pub async fn forward_contact_message(&self, message: &ContactMessage) -> AppResult<()> {
        let subject = format!("New contact message from {}", message.name);
        let text = format!(
            "Name: {}\nEmail: {}\n\nMessage:\n{}",
            message.name, message.email, message.message
        );
        self.send(&self.notify_addresses, &subject, &text).await
    }
}
