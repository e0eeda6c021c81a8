use utoipa::OpenApi;

use crate::models::*;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Fetch a document, creating it empty if missing
#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    params(
        ("id" = String, Path, description = "Document id")
    ),
    responses(
        (status = 200, description = "The document", body = DocumentResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn fetch_document_doc() {}

/// Save a document
#[utoipa::path(
    put,
    path = "/api/documents/{id}",
    params(
        ("id" = String, Path, description = "Document id")
    ),
    request_body = SaveDocumentRequest,
    responses(
        (status = 200, description = "Document saved", body = DocumentResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn save_document_doc() {}

/// Diagnostics endpoint
#[utoipa::path(
    get,
    path = "/api/diagnostics",
    responses(
        (status = 200, description = "Live service counters", body = DiagnosticsResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        fetch_document_doc,
        save_document_doc,
        diagnostics_doc,
    ),
    components(
        schemas(HealthResponse, DocumentResponse, SaveDocumentRequest, DiagnosticsResponse, ErrorResponse)
    ),
    tags(
        (name = "api", description = "API endpoints")
    )
)]
pub struct ApiDoc;
