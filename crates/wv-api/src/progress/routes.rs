use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use wv_db::models::{ProgressEntry, ProgressUpdate};

use crate::{
    ApiState,
    auth::AuthUser,
    error::ApiError,
    validation::{clamp_percentage, validate_required},
};

/// Create the progress routes
pub fn routes() -> Router<ApiState> {
    Router::new().route("/progress", get(get_progress).post(update_progress))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressRequest {
    subject: Option<String>,
    topic: Option<String>,
    percentage: Option<f64>,
    time_spent: Option<u64>,
}

#[derive(Serialize)]
struct ProgressResponse {
    message: String,
    progress: ProgressEntry,
}

async fn update_progress(
    AuthUser(user): AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<ProgressRequest>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let (Some(subject), Some(topic), Some(percentage)) =
        (payload.subject, payload.topic, payload.percentage)
    else {
        return Err(ApiError::Validation(
            "Subject, topic, and percentage are required".to_string(),
        ));
    };

    validate_required("Subject", &subject, 100)?;
    validate_required("Topic", &topic, 200)?;

    let progress = state
        .store
        .update_progress(
            user.id,
            ProgressUpdate {
                subject: subject.trim().to_string(),
                topic: Some(topic.trim().to_string()),
                percentage: clamp_percentage(percentage),
                time_spent: payload.time_spent.unwrap_or(0),
            },
        )
        .await?;

    Ok(Json(ProgressResponse {
        message: "Progress updated successfully".to_string(),
        progress,
    }))
}

async fn get_progress(
    AuthUser(user): AuthUser,
    State(state): State<ApiState>,
) -> Json<Vec<ProgressEntry>> {
    Json(state.store.get_user_progress(user.id).await)
}
