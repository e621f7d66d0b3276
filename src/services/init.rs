//! Startup helpers: optional integrations and background workers.

use std::sync::Arc;

use crate::config::Config;
use crate::services::google_calendar::{CalendarTransport, GoogleCalendarService};
use crate::services::mail::MailService;
use crate::services::sync::CalendarSync;

/// Construct the Google Calendar transport if credentials are available.
/// Absent or unreadable credentials disable sync instead of failing startup.
pub fn init_calendar(config: &Config) -> Option<Arc<dyn CalendarTransport>> {
    match GoogleCalendarService::from_key_file(&config.google.service_account_file) {
        Ok(Some(service)) => {
            tracing::info!("Google Calendar sync enabled");
            Some(Arc::new(service))
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("Failed to initialize Google Calendar service: {:?}", e);
            None
        }
    }
}

pub fn init_mail(config: &Config) -> Option<MailService> {
    match MailService::from_config(&config.mail) {
        Some(service) => {
            tracing::info!("Mail dispatch enabled");
            Some(service)
        }
        None => {
            tracing::info!("No mail provider configured; email notifications disabled");
            None
        }
    }
}

/// Spawn the periodic calendar pull worker, if enabled.
///
/// Returns the join handles so the caller can await shutdown. Each worker
/// listens on the shutdown broadcast channel.
pub fn spawn_background_workers(
    state: Arc<crate::AppState>,
    shutdown: tokio::sync::broadcast::Sender<()>,
) -> Vec<tokio::task::JoinHandle<()>> {
    let mut handles = Vec::new();

    let interval = state.config.sync.interval_seconds;
    if interval == 0 {
        tracing::info!("Calendar pull worker disabled (SYNC_INTERVAL_SECONDS=0)");
        return handles;
    }

    let mut shutdown_rx = shutdown.subscribe();
    handles.push(tokio::spawn(async move {
        loop {
            tracing::info!("Starting periodic calendar pull");
            let report = CalendarSync::pull_all(&state).await;
            if report.updated > 0 {
                tracing::info!("Calendar pull applied {} update(s)", report.updated);
            }

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Calendar pull worker shutting down");
                    break;
                }
                _ = tokio::time::sleep(std::time::Duration::from_secs(interval)) => {}
            }
        }
    }));

    handles
}
