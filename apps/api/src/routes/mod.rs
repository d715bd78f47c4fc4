pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::chat;
use crate::logs;
use crate::plan;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/analyze-company",
            post(plan::handlers::handle_analyze_company),
        )
        .route("/chatbot", post(chat::handlers::handle_chatbot))
        .route("/admin-logs", get(logs::handlers::handle_admin_logs))
        .with_state(state)
}
