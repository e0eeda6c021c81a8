use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::StoredDocument;

/// A document as returned by the REST surface
#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StoredDocument> for DocumentResponse {
    fn from(document: StoredDocument) -> Self {
        Self {
            id: document.id,
            content: document.content,
            created_at: document.created_at,
            updated_at: document.updated_at,
        }
    }
}

/// Request body for saving a document
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SaveDocumentRequest {
    pub content: String,
}
