use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use wv_db::models::Announcement;

use crate::ApiState;

/// Public announcement feed
pub fn routes() -> Router<ApiState> {
    Router::new().route("/announcements", get(list_announcements))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnouncementQuery {
    class_name: Option<String>,
}

async fn list_announcements(
    State(state): State<ApiState>,
    Query(query): Query<AnnouncementQuery>,
) -> Json<Vec<Announcement>> {
    let class_name = query.class_name.as_deref().filter(|c| !c.is_empty());
    Json(state.store.get_announcements(class_name).await)
}
