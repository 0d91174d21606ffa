use axum::{routing::get, Router, Extension};
use std::sync::Arc;

use crate::{AppState, health_with_pool};
use crate::controllers;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|Extension(state): Extension<Arc<AppState>>| async move {
            health_with_pool(&state.pool).await
        }))
        .route("/messages", get(controllers::list_messages).post(controllers::create_message))
        .route("/ws", get(controllers::ws_handler))
        .layer(Extension(state))
}
