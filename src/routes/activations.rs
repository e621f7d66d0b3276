use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::db::models::{Activation, CreateActivation};
use crate::db::ActivationRepository;
use crate::error::{AppError, AppResult};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_activations).post(create_activation))
}

async fn list_activations(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Activation>>> {
    Ok(Json(ActivationRepository::list_all(&state.db).await?))
}

async fn create_activation(
    State(state): State<Arc<AppState>>,
    Json(create): Json<CreateActivation>,
) -> AppResult<(StatusCode, Json<Activation>)> {
    if create.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Activation name is required".to_string(),
        ));
    }
    let activation = ActivationRepository::create(&state.db, create).await?;
    Ok((StatusCode::CREATED, Json(activation)))
}
