use axum::{
    extract::{Path, State},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;

use super::ok;
use crate::error::CoreError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/e/{slug}", get(get_public_event))
}

// GET /api/e/{slug}
async fn get_public_event(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Response, CoreError> {
    let public = state.projection.assemble(&slug).await?;
    Ok(ok(public.into_view()))
}
