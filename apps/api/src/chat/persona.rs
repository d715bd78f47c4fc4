//! Persona chat — the portfolio chatbot over the shared LLM client.

use std::time::Instant;

use serde::Deserialize;

use crate::chat::prompts::PERSONA_SYSTEM;
use crate::errors::AppError;
use crate::llm_client::{ChatMessage, CompletionProvider};
use crate::models::usage::UsageMetadata;

/// One prior turn of the conversation, as sent by the frontend.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// A completed chat turn: reply text plus usage accounting for the audit log.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub response: String,
    pub metadata: UsageMetadata,
}

/// Runs one persona chat turn against the LLM provider.
pub async fn chat(
    llm: &dyn CompletionProvider,
    message: &str,
    history: &[HistoryTurn],
) -> Result<ChatReply, AppError> {
    let started = Instant::now();
    let messages = build_messages(history, message);

    let completion = llm
        .complete(PERSONA_SYSTEM, &messages)
        .await
        .map_err(|e| AppError::Provider(format!("Chat completion failed: {e}")))?;

    let metadata =
        UsageMetadata::from_usage(&completion.usage, started.elapsed().as_millis() as u64);

    Ok(ChatReply {
        response: completion.text,
        metadata,
    })
}

/// Maps frontend history onto provider turns and appends the new message.
/// Empty turns are dropped; any role other than "assistant" is treated as the
/// user, since the provider rejects unknown roles.
fn build_messages<'a>(history: &'a [HistoryTurn], message: &'a str) -> Vec<ChatMessage<'a>> {
    let mut messages: Vec<ChatMessage<'a>> = history
        .iter()
        .filter(|turn| !turn.content.trim().is_empty())
        .map(|turn| {
            if turn.role == "assistant" {
                ChatMessage::assistant(&turn.content)
            } else {
                ChatMessage::user(&turn.content)
            }
        })
        .collect();
    messages.push(ChatMessage::user(message));
    messages
}
