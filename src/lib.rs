//! Real-time collaborative document service.
//!
//! Clients attach to a shared room over WebSockets, see each other's edits
//! with low latency, and have the content persisted through a per-document
//! debounced write. Last write observed wins; there is no merge of
//! concurrent edits.

pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod persist;
pub mod routes;
pub mod sync;
pub mod ws;

use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use db::DocStore;
use persist::PersistenceCoordinator;
use ws::{ChangeBroadcaster, RoomRegistry};

/// Shared state for the HTTP and WebSocket surfaces
pub struct AppState {
    pub store: Arc<dyn DocStore>,
    pub registry: Arc<RoomRegistry>,
    pub broadcaster: ChangeBroadcaster,
    pub coordinator: PersistenceCoordinator,
}

impl AppState {
    pub fn new(store: Arc<dyn DocStore>, save_debounce: Duration) -> Self {
        let registry = Arc::new(RoomRegistry::new());
        Self {
            broadcaster: ChangeBroadcaster::new(registry.clone()),
            coordinator: PersistenceCoordinator::new(store.clone(), save_debounce),
            registry,
            store,
        }
    }
}

/// Build the application router: REST surface, Swagger UI, and the
/// WebSocket endpoint.
pub fn app(app_state: Arc<AppState>, cors: CorsLayer) -> Router {
    let ws_routes = Router::new()
        .route("/ws", get(ws::handler::websocket_handler))
        .with_state(app_state.clone());

    Router::new()
        // Mount API routes
        .nest("/api", routes::create_api_routes(app_state))
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        // Mount the real-time transport
        .merge(ws_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
