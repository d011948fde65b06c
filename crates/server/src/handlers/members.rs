//! Member API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use quorum_store::Document;

use crate::error::AppResult;
use crate::services::member::{CreateMemberRequest, MemberService};

/// Query parameters for listing members.
#[derive(Debug, Default, Deserialize)]
pub struct ListMembersQuery {
    /// Filter by membership status.
    pub status: Option<String>,
}

/// Create a member.
///
/// `POST /api/members`
pub async fn create(
    State(service): State<MemberService>,
    Json(request): Json<CreateMemberRequest>,
) -> AppResult<(StatusCode, Json<Document>)> {
    let doc = service.create(request).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// List members.
///
/// `GET /api/members?status=active`
pub async fn list(
    State(service): State<MemberService>,
    Query(query): Query<ListMembersQuery>,
) -> AppResult<Json<Vec<Document>>> {
    let docs = service.list(query.status.as_deref()).await?;
    Ok(Json(docs))
}

/// Get a member by id.
///
/// `GET /api/members/:id`
pub async fn get(
    State(service): State<MemberService>,
    Path(id): Path<String>,
) -> AppResult<Json<Document>> {
    let doc = service.get(&id).await?;
    Ok(Json(doc))
}

/// Partially update a member.
///
/// `PATCH /api/members/:id`
pub async fn update(
    State(service): State<MemberService>,
    Path(id): Path<String>,
    Json(partial): Json<serde_json::Value>,
) -> AppResult<Json<Document>> {
    let doc = service.update(&id, partial).await?;
    Ok(Json(doc))
}
