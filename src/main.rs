use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod error;
mod routes;
mod services;

use config::Config;
use services::google_calendar::CalendarTransport;
use services::init;
use services::mail::MailService;

pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: Config,
    /// `None` when no service-account credentials are available; every
    /// push becomes a no-op and every pull an empty result.
    pub calendar: Option<Arc<dyn CalendarTransport>>,
    pub mail: Option<MailService>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gig_planner=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting Gig Planner");

    let pool = db::init_db(&config).await?;

    let calendar = init::init_calendar(&config);
    let mail = init::init_mail(&config);

    let app_state = Arc::new(AppState {
        db: pool,
        config: config.clone(),
        calendar,
        mail,
    });

    // Shutdown notifier for background workers.
    let (shutdown_tx, _shutdown_rx) = tokio::sync::broadcast::channel::<()>(1);
    let bg_handles = init::spawn_background_workers(app_state.clone(), shutdown_tx.clone());

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/bookings", routes::bookings::router())
        .nest("/api/venues", routes::venues::router())
        .nest("/api/performers", routes::performers::router())
        .nest("/api/activations", routes::activations::router())
        .nest("/api/calendar", routes::calendar::router())
        .nest("/api/contact", routes::contact::router())
        .with_state(app_state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(
                    config
                        .server
                        .frontend_url
                        .parse::<HeaderValue>()
                        .expect("Invalid FRONTEND_URL for CORS"),
                )
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ]),
        );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let server_fut = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );

    let shutdown_tx_clone = shutdown_tx.clone();
    let signal_fut = async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut term =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("Failed to bind SIGTERM");
            tokio::select! {
                _ = ctrl_c => {},
                _ = term.recv() => {},
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await.expect("Failed to bind Ctrl+C");
        }

        tracing::info!("Shutdown signal received, notifying background workers");
        let _ = shutdown_tx_clone.send(());
    };

    tokio::select! {
        res = server_fut => {
            if let Err(e) = res {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = signal_fut => {}
    }

    for handle in bg_handles {
        let _ = handle.await;
    }
    tracing::info!("Shutdown complete");

    Ok(())
}
