use axum::{routing::get, Router};
use std::sync::Arc;

use crate::handlers::{diagnostics, fetch_document, health_check, ready_check, save_document};
use crate::AppState;

/// Create API routes
pub fn create_api_routes(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/diagnostics", get(diagnostics))
        .route("/documents/:id", get(fetch_document).put(save_document))
        .with_state(app_state)
}
