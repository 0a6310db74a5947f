use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, patch, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::{created, ok};
use crate::error::CoreError;
use crate::middleware::AuthUser;
use crate::models::{EventPatch, NewEvent, SectionPatch, ThemeInput};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_my_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/events/{id}/publish", patch(publish_event))
        .route("/events/{id}/theme", put(update_theme))
        .route("/events/{id}/sections/{section_id}", patch(update_section))
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub publish: bool,
}

// POST /api/events
async fn create_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<NewEvent>,
) -> Result<Response, CoreError> {
    let event = state.events.create(user.user_id, req).await?;
    Ok(created(event))
}

// GET /api/events
async fn list_my_events(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Response, CoreError> {
    let events = state.events.list_by_owner(user.user_id).await?;
    Ok(ok(events))
}

// GET /api/events/{id}
async fn get_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, CoreError> {
    let event = state.events.get_for_viewer(user.user_id, id).await?;
    Ok(ok(event))
}

// PATCH /api/events/{id}
async fn update_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<EventPatch>,
) -> Result<Response, CoreError> {
    let event = state.events.update(user.user_id, id, req).await?;
    Ok(ok(event))
}

// DELETE /api/events/{id}
async fn delete_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, CoreError> {
    state.events.delete(user.user_id, id).await?;
    Ok(ok(json!({ "id": id })))
}

// PATCH /api/events/{id}/publish
async fn publish_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<PublishRequest>,
) -> Result<Response, CoreError> {
    let event = state.events.publish(user.user_id, id, req.publish).await?;
    Ok(ok(json!({ "is_published": event.is_published })))
}

// PUT /api/events/{id}/theme
async fn update_theme(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ThemeInput>,
) -> Result<Response, CoreError> {
    let theme = state.events.update_theme(user.user_id, id, req).await?;
    Ok(ok(theme))
}

// PATCH /api/events/{id}/sections/{section_id}
async fn update_section(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((id, section_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<SectionPatch>,
) -> Result<Response, CoreError> {
    let section = state
        .events
        .update_section(user.user_id, id, section_id, req)
        .await?;
    Ok(ok(section))
}
