//! Pull-style reads of the in-memory message log.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use huddle_common::{Message, MessageId};

use crate::error::{ApiError, ApiErrorBody};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", get(list_messages))
        .route("/messages/{message_id}", get(get_message))
}

// ---------------------------------------------------------------------------
// GET /api/messages
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/messages",
    tag = "Messages",
    responses(
        (status = 200, description = "Public messages still in the log, oldest first", body = Vec<Message>),
    ),
)]
pub async fn list_messages(State(state): State<AppState>) -> Json<Vec<Message>> {
    Json(state.gateway.public_messages())
}

// ---------------------------------------------------------------------------
// GET /api/messages/{message_id}
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/messages/{message_id}",
    tag = "Messages",
    params(("message_id" = u64, Path, description = "Message ID")),
    responses(
        (status = 200, description = "The message", body = Message),
        (status = 400, description = "Invalid message ID", body = ApiErrorBody),
        (status = 404, description = "Never existed, evicted, or private", body = ApiErrorBody),
    ),
)]
pub async fn get_message(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    let message_id: MessageId = message_id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid message ID"))?;
    let message = state.gateway.public_message(message_id)?;
    Ok(Json(message))
}
