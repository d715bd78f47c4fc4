//! Axum route handlers for the chatbot API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::chat::persona::{self, HistoryTurn};
use crate::errors::AppError;
use crate::models::logs::NewChatLog;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<HistoryTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatbotResponse {
    pub response: String,
}

/// POST /chatbot
///
/// Delegates to the persona collaborator and appends one audit record per
/// post-validation attempt, fire-and-forget.
pub async fn handle_chatbot(
    State(state): State<AppState>,
    Json(request): Json<ChatbotRequest>,
) -> Result<Json<ChatbotResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }

    let history_turns = request.conversation_history.len();
    let outcome = persona::chat(
        state.llm.as_ref(),
        &request.message,
        &request.conversation_history,
    )
    .await;

    let record = match &outcome {
        Ok(reply) => NewChatLog::success(&request.message, history_turns, reply),
        Err(err) => {
            error!("Chatbot call failed: {err}");
            NewChatLog::failure(&request.message, history_turns, &err.to_string())
        }
    };

    let logs = state.logs.clone();
    tokio::spawn(async move { logs.append_chat(record).await });

    outcome.map(|reply| {
        Json(ChatbotResponse {
            response: reply.response,
        })
    })
}
