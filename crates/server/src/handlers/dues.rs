//! Dues API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use quorum_store::Document;

use crate::error::AppResult;
use crate::services::dues::{DuesService, RecordDuesRequest};

/// Query parameters for listing dues.
#[derive(Debug, Default, Deserialize)]
pub struct ListDuesQuery {
    /// Filter by member.
    pub member_id: Option<String>,
}

/// Record a dues payment.
///
/// `POST /api/dues`
pub async fn record(
    State(service): State<DuesService>,
    Json(request): Json<RecordDuesRequest>,
) -> AppResult<(StatusCode, Json<Document>)> {
    let doc = service.record(request).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// List dues records.
///
/// `GET /api/dues?member_id=m-1`
pub async fn list(
    State(service): State<DuesService>,
    Query(query): Query<ListDuesQuery>,
) -> AppResult<Json<Vec<Document>>> {
    let docs = service.list(query.member_id.as_deref()).await?;
    Ok(Json(docs))
}

/// Get a dues record by id.
///
/// `GET /api/dues/:id`
pub async fn get(
    State(service): State<DuesService>,
    Path(id): Path<String>,
) -> AppResult<Json<Document>> {
    let doc = service.get(&id).await?;
    Ok(Json(doc))
}
