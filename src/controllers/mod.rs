pub mod events;
pub mod guests;
#[cfg(feature = "media")]
pub mod media;
pub mod public;
pub mod templates;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    let router = Router::new()
        .merge(templates::routes())
        .merge(public::routes())
        .merge(events::routes())
        .merge(guests::routes());

    #[cfg(feature = "media")]
    let router = router.merge(media::routes());

    router
}

/// Полное приложение: API, раздача загруженных файлов, CORS и трассировка.
pub fn app(state: Arc<AppState>) -> Router {
    let uploads = ServeDir::new(&state.config.storage.base_path);

    Router::new()
        .route("/", get(|| async { "Invitation API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", routes())
        .nest_service("/uploads", uploads)
        .layer(cors_layer(&state.config.app.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("CORS: invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

pub(crate) fn ok<T: Serialize>(data: T) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

pub(crate) fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(json!({ "success": true, "data": data }))).into_response()
}
