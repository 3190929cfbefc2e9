use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};

use palaver_types::api::{MessageQuery, RegisterRequest, SendMessageRequest};

use crate::error::ApiError;
use crate::identity::ClaimedName;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/participants", post(register_participant).get(list_participants))
        .route("/messages", post(send_message).get(list_messages))
        .route("/messages/{id}", delete(delete_message))
        .route("/status", post(heartbeat))
        .route("/health", get(health))
        .with_state(state)
}

/// POST /participants
pub async fn register_participant(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let participant = state.registry.register(req.name.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

/// GET /participants
pub async fn list_participants(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.registry.list().await?))
}

/// POST /messages — sender comes from the `User` header.
pub async fn send_message(
    State(state): State<AppState>,
    sender: ClaimedName,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let message = state.messages.send(sender.as_deref(), &req).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /messages?limit=N
pub async fn list_messages(
    State(state): State<AppState>,
    viewer: ClaimedName,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = state
        .messages
        .list(viewer.as_deref(), query.limit.as_deref())
        .await?;
    Ok(Json(messages))
}

/// DELETE /messages/{id}
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    requester: ClaimedName,
) -> Result<impl IntoResponse, ApiError> {
    state.messages.delete(&id, requester.as_deref()).await?;
    Ok(StatusCode::OK)
}

/// POST /status — heartbeat for the participant in the `User` header.
pub async fn heartbeat(
    State(state): State<AppState>,
    participant: ClaimedName,
) -> Result<impl IntoResponse, ApiError> {
    state.registry.heartbeat(participant.as_deref()).await?;
    Ok(StatusCode::OK)
}

pub async fn health() -> &'static str {
    "ok"
}
