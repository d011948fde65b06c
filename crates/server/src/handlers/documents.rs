//! Document API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use quorum_store::Document;

use crate::error::AppResult;
use crate::services::document::{CreateDocumentRequest, DocumentService};

/// Create a document.
///
/// `POST /api/documents`
pub async fn create(
    State(service): State<DocumentService>,
    Json(request): Json<CreateDocumentRequest>,
) -> AppResult<(StatusCode, Json<Document>)> {
    let doc = service.create(request).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// List documents.
///
/// `GET /api/documents`
pub async fn list(State(service): State<DocumentService>) -> AppResult<Json<Vec<Document>>> {
    let docs = service.list().await?;
    Ok(Json(docs))
}

/// Get a document by id.
///
/// `GET /api/documents/:id`
pub async fn get(
    State(service): State<DocumentService>,
    Path(id): Path<String>,
) -> AppResult<Json<Document>> {
    let doc = service.get(&id).await?;
    Ok(Json(doc))
}

/// Partially update a document.
///
/// `PATCH /api/documents/:id`
pub async fn update(
    State(service): State<DocumentService>,
    Path(id): Path<String>,
    Json(partial): Json<serde_json::Value>,
) -> AppResult<Json<Document>> {
    let doc = service.update(&id, partial).await?;
    Ok(Json(doc))
}
