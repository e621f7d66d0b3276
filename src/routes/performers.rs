use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::db::models::{CreatePerformer, Performer};
use crate::db::PerformerRepository;
use crate::error::{AppError, AppResult};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_performers).post(create_performer))
        .route("/:id", get(get_performer))
}

async fn list_performers(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Performer>>> {
    Ok(Json(PerformerRepository::list_all(&state.db).await?))
}

async fn get_performer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Performer>> {
    PerformerRepository::get(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Performer {} not found", id)))
}

async fn create_performer(
    State(state): State<Arc<AppState>>,
    Json(create): Json<CreatePerformer>,
) -> AppResult<(StatusCode, Json<Performer>)> {
    if create.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Performer name is required".to_string(),
        ));
    }
    let performer = PerformerRepository::create(&state.db, create).await?;
    Ok((StatusCode::CREATED, Json(performer)))
}
