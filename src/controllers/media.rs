use axum::{
    extract::{Multipart, Path, State},
    response::Response,
    routing::{delete, get},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::{created, ok};
use crate::error::CoreError;
use crate::middleware::AuthUser;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events/{id}/media", get(list_media).post(upload_media))
        .route("/events/{id}/media/{media_id}", delete(delete_media))
}

// POST /api/events/{id}/media (multipart, поле "file")
async fn upload_media(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Response, CoreError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CoreError::InvalidInput(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| CoreError::InvalidInput(format!("failed to read file: {}", e)))?;
        upload = Some((file_name, bytes));
        break;
    }
    let (file_name, bytes) =
        upload.ok_or_else(|| CoreError::InvalidInput("file is required".to_string()))?;

    // сначала права, потом запись на диск
    let ticket = state.media.prepare_upload(user.user_id, id, &file_name).await?;
    let url = state
        .blobs
        .put(&ticket.storage_key, &bytes)
        .await
        .map_err(|e| CoreError::Internal(format!("failed to save file: {}", e)))?;

    let media = state.media.attach(ticket, url).await?;
    Ok(created(media))
}

// GET /api/events/{id}/media
async fn list_media(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, CoreError> {
    let media = state.media.list(user.user_id, id).await?;
    Ok(ok(media))
}

// DELETE /api/events/{id}/media/{media_id}
async fn delete_media(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((id, media_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, CoreError> {
    let media = state.media.delete(user.user_id, id, media_id).await?;
    Ok(ok(json!({ "id": media.id })))
}
