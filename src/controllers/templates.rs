use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::ok;
use crate::error::CoreError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/templates", get(list_templates))
        .route("/templates/{id}", get(get_template))
}

#[derive(Debug, Deserialize)]
pub struct TemplatesQuery {
    pub category: Option<String>,
}

// GET /api/templates?category=wedding
async fn list_templates(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TemplatesQuery>,
) -> Result<Response, CoreError> {
    let category = params.category.as_deref().filter(|c| !c.is_empty());
    let templates = state.templates.list(category).await?;
    Ok(ok(templates))
}

// GET /api/templates/{id}
async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, CoreError> {
    let template = state.templates.get(id).await?;
    Ok(ok(template))
}
