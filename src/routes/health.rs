use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: bool,
    /// Whether calendar credentials loaded; pushes and pulls are no-ops
    /// without them, but the service still serves bookings.
    pub calendar_sync: bool,
    pub timestamp: String,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();

    let status_code = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let response = HealthResponse {
        status: if database { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        calendar_sync: state.calendar.is_some(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::db::test_pool;

    async fn test_app() -> Router {
        let state = Arc::new(AppState {
            db: test_pool().await,
            config: Config::for_tests(),
            calendar: None,
            mail: None,
        });
        Router::new()
            .route("/health", get(health_check))
            .with_state(state)
    }

    #[tokio::test]
    async fn health_reports_database_and_sync_state() {
        let app = test_app().await;

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], true);
        assert_eq!(body["calendar_sync"], false);
    }
}
