use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::models::{DocumentResponse, ErrorResponse, SaveDocumentRequest};
use crate::AppState;

/// Save a document, creating it if it does not exist
///
/// This is the direct write path used by the REST surface; it is not
/// debounced. Real-time edits go through the WebSocket and the
/// persistence coordinator instead.
pub async fn save_document(
    State(app_state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
    Json(payload): Json<SaveDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), (StatusCode, Json<ErrorResponse>)> {
    info!("Saving document {}", document_id);

    match app_state.store.upsert(&document_id, &payload.content).await {
        Ok(document) => Ok((StatusCode::OK, Json(DocumentResponse::from(document)))),
        Err(e) => {
            error!("Error saving document '{}': {}", document_id, e);
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            Err((
                status,
                Json(ErrorResponse {
                    code: status.as_u16(),
                    status: status.to_string(),
                    error: format!("Error saving document '{}'", document_id),
                }),
            ))
        }
    }
}
