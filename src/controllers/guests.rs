use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{created, ok};
use crate::error::CoreError;
use crate::middleware::AuthUser;
use crate::models::{NewGuest, RsvpStatus};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events/{id}/rsvp", post(submit_rsvp))
        .route("/events/{id}/guests", get(list_guests))
        .route("/events/{id}/guests/{guest_id}", patch(update_guest_status))
}

#[derive(Debug, Deserialize)]
pub struct GuestStatusRequest {
    pub status: RsvpStatus,
}

// POST /api/events/{id}/rsvp (публичный)
async fn submit_rsvp(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<NewGuest>,
) -> Result<Response, CoreError> {
    let guest = state.rsvp.submit(id, req).await?;
    Ok(created(guest))
}

// GET /api/events/{id}/guests (только владелец)
async fn list_guests(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, CoreError> {
    let guests = state.rsvp.list_guests(user.user_id, id).await?;
    Ok(ok(guests))
}

// PATCH /api/events/{id}/guests/{guest_id}
async fn update_guest_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((id, guest_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<GuestStatusRequest>,
) -> Result<Response, CoreError> {
    let guest = state
        .rsvp
        .update_guest_status(user.user_id, id, guest_id, req.status)
        .await?;
    Ok(ok(guest))
}
