//! Notification API handlers.

use axum::{extract::State, http::StatusCode, Json};

use quorum_store::Document;

use crate::error::AppResult;
use crate::services::notification::{NotificationService, SendNotificationRequest};

/// Send a notification.
///
/// `POST /api/notifications`
pub async fn send(
    State(service): State<NotificationService>,
    Json(request): Json<SendNotificationRequest>,
) -> AppResult<(StatusCode, Json<Document>)> {
    let doc = service.send(request).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// List the notification log.
///
/// `GET /api/notifications`
pub async fn list(State(service): State<NotificationService>) -> AppResult<Json<Vec<Document>>> {
    let docs = service.list().await?;
    Ok(Json(docs))
}
