use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wv_db::models::{Announcement, NewAnnouncement, PlatformStats};

use crate::{
    ApiState, auth::AdminUser, error::ApiError, user::UserResponse,
    validation::validate_required,
};

/// Create the admin dashboard routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/stats", get(stats))
        .route("/admin/announcements", post(create_announcement))
        .route("/admin/announcements/{id}", delete(delete_announcement))
}

async fn list_users(_admin: AdminUser, State(state): State<ApiState>) -> Json<Vec<UserResponse>> {
    let users = state
        .store
        .list_users()
        .await
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Json(users)
}

async fn stats(_admin: AdminUser, State(state): State<ApiState>) -> Json<PlatformStats> {
    Json(state.store.platform_stats().await)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnouncementRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    target_class: Option<String>,
}

#[derive(Serialize)]
struct AnnouncementResponse {
    message: String,
    announcement: Announcement,
}

async fn create_announcement(
    AdminUser(admin): AdminUser,
    State(state): State<ApiState>,
    Json(payload): Json<AnnouncementRequest>,
) -> Result<(StatusCode, Json<AnnouncementResponse>), ApiError> {
    validate_required("Title", &payload.title, 200)?;
    validate_required("Message", &payload.message, 5000)?;

    let announcement = state
        .store
        .create_announcement(NewAnnouncement {
            title: payload.title.trim().to_string(),
            message: payload.message.trim().to_string(),
            kind: payload
                .kind
                .filter(|k| !k.trim().is_empty())
                .unwrap_or_else(|| "info".to_string()),
            target_class: payload.target_class.filter(|c| !c.trim().is_empty()),
            created_by: admin.id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AnnouncementResponse {
            message: "Announcement created successfully".to_string(),
            announcement,
        }),
    ))
}

async fn delete_announcement(
    _admin: AdminUser,
    State(state): State<ApiState>,
    Path(announcement_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store
        .deactivate_announcement(announcement_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Announcement not found".to_string()))?;

    Ok(Json(serde_json::json!({
        "message": "Announcement deleted successfully",
        "id": announcement_id
    })))
}
