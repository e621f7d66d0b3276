use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::db::models::{ContactMessage, CreateContactMessage};
use crate::db::ContactMessageRepository;
use crate::error::{AppError, AppResult};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_messages).post(submit_message))
}

async fn list_messages(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<ContactMessage>>> {
    Ok(Json(ContactMessageRepository::list_all(&state.db).await?))
}

/// Store the message, then forward it to stakeholders on a best-effort
/// basis. The sender gets a success either way; delivery problems are an
/// operator concern.
async fn submit_message(
    State(state): State<Arc<AppState>>,
    Json(create): Json<CreateContactMessage>,
) -> AppResult<(StatusCode, Json<ContactMessage>)> {
    if create.name.trim().is_empty() || create.message.trim().is_empty() {
        return Err(AppError::Validation(
            "Name and message are required".to_string(),
        ));
    }

    let message = ContactMessageRepository::create(&state.db, create).await?;

    if let Some(mail) = state.mail.as_ref() {
        if let Err(e) = mail.forward_contact_message(&message).await {
            tracing::warn!("Failed to forward contact message {}: {:?}", message.id, e);
        }
    }

    Ok((StatusCode::CREATED, Json(message)))
}
