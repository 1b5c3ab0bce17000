//! Shopping-guide chat endpoint.
//!
//! - `POST /api/v1/ai-guide/chat` - answers the last message of the conversation

use axum::{extract::State, routing::post, Json, Router};
use storefront_agent::{ChatRequest, ChatResponse};
use tracing::info;

use crate::bootstrap::AppState;
use crate::error::ApiError;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/ai-guide/chat", post(chat))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let question = request.question()?;
    let reply = state.gateway.respond(state.catalog.as_ref(), question).await?;

    info!(
        event_name = "assistant.chat.answered",
        session_id = request.session_id.as_deref().unwrap_or("anonymous"),
        source = ?reply.source,
        recommended = reply.products.len(),
        "chat request answered"
    );
    Ok(Json(ChatResponse::from(reply)))
}
