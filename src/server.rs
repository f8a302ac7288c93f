use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AssistantError;
use crate::models::ChatMessage;
use crate::service::AssistantService;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub notices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

struct ApiError(AssistantError);

impl From<AssistantError> for ApiError {
    fn from(e: AssistantError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AssistantError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

pub fn router(service: Arc<AssistantService>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/chat", post(chat))
        .route("/sessions/:id/transcript", get(transcript))
        .with_state(service)
}

async fn chat(
    State(service): State<Arc<AssistantService>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session_id = req
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let outcome = service.handle_turn(&session_id, &req.message).await?;
    let reply = outcome.answer();
    let error = outcome.reply.as_ref().err().map(ToString::to_string);

    Ok(Json(ChatResponse {
        session_id,
        notices: outcome.notices,
        reply,
        error,
        trace: outcome.trace,
    }))
}

async fn transcript(
    State(service): State<Arc<AssistantService>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    Ok(match service.transcript(&id).await? {
        Some(t) => Json::<Vec<ChatMessage>>(t.messages().to_vec()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}
