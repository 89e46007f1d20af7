use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{HeaderMap, header, request::Parts},
    routing::post,
};
use serde::Deserialize;
use wv_db::models::NewAnalyticsEvent;

use crate::{ApiState, auth::AuthUser, error::ApiError, validation::validate_required};

/// Create the analytics routes
pub fn routes() -> Router<ApiState> {
    Router::new().route("/analytics/event", post(track_event))
}

/// Client address: the socket peer, or the first `X-Forwarded-For` hop when
/// `trust_proxy` is enabled
#[derive(Debug, Clone)]
pub struct ClientIp(pub Option<String>);

impl FromRequestParts<ApiState> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let forwarded = state
            .trust_proxy
            .then(|| parts.headers.get("x-forwarded-for"))
            .flatten()
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty());

        let peer = || {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        };

        Ok(Self(forwarded.or_else(peer)))
    }
}

#[derive(Debug, Deserialize)]
struct EventRequest {
    #[serde(default)]
    category: String,
    #[serde(default)]
    action: String,
    label: Option<String>,
    value: Option<i64>,
}

async fn track_event(
    AuthUser(user): AuthUser,
    State(state): State<ApiState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    Json(payload): Json<EventRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    validate_required("Category", &payload.category, 100)?;
    validate_required("Action", &payload.action, 100)?;

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state
        .store
        .record_event(NewAnalyticsEvent {
            user_id: user.id,
            category: payload.category,
            action: payload.action,
            label: payload.label,
            value: payload.value.unwrap_or(0),
            user_agent,
            ip,
        })
        .await?;

    Ok(Json(
        serde_json::json!({ "message": "Event tracked successfully" }),
    ))
}
