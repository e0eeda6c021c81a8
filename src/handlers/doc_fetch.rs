use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::models::{DocumentResponse, ErrorResponse};
use crate::AppState;

/// Fetch a document by id, creating an empty one if it does not exist
pub async fn fetch_document(
    State(app_state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> Result<(StatusCode, Json<DocumentResponse>), (StatusCode, Json<ErrorResponse>)> {
    info!("Fetching document {}", document_id);

    let existing = match app_state.store.get(&document_id).await {
        Ok(existing) => existing,
        Err(e) => {
            error!("Error fetching document '{}': {}", document_id, e);
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            return Err((
                status,
                Json(ErrorResponse {
                    code: status.as_u16(),
                    status: status.to_string(),
                    error: format!("Error fetching document '{}'", document_id),
                }),
            ));
        }
    };

    let document = match existing {
        Some(document) => document,
        // Create a new document with empty content
        None => match app_state.store.upsert(&document_id, "").await {
            Ok(document) => document,
            Err(e) => {
                error!("Error creating document '{}': {}", document_id, e);
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                return Err((
                    status,
                    Json(ErrorResponse {
                        code: status.as_u16(),
                        status: status.to_string(),
                        error: format!("Error creating document '{}'", document_id),
                    }),
                ));
            }
        },
    };

    Ok((StatusCode::OK, Json(DocumentResponse::from(document))))
}
