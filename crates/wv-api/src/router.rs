use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::Utc;

use crate::{
    admin, analytics, announcement, auth, metrics::metrics_handler, progress, resource,
    state::ApiState,
};

pub fn router() -> Router<ApiState> {
    let api = Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(resource::routes())
        .merge(progress::routes())
        .merge(admin::routes())
        .merge(announcement::routes())
        .merge(analytics::routes())
        .fallback(handler_404);

    Router::new()
        .nest("/api", api)
        .route("/metrics", get(metrics_handler))
}

async fn health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "OK",
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.environment.to_string(),
    }))
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "API endpoint not found" })),
    )
}
