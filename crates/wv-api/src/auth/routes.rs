use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::{middleware::AuthUser, service};
use crate::{
    ApiState,
    error::ApiError,
    user::UserResponse,
    validation::{validate_email, validate_password, validate_required},
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/verify", get(verify))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    class_name: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserResponse,
    pub token: String,
}

async fn register(
    State(state): State<ApiState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
        || payload.class_name.trim().is_empty()
    {
        return Err(ApiError::Validation("All fields are required".to_string()));
    }

    let email = payload.email.trim().to_lowercase();
    validate_email(&email)?;
    validate_password(&payload.password)?;
    validate_required("Name", &payload.name, 100)?;
    validate_required("Class", &payload.class_name, 50)?;

    let user = service::register_user(
        &state.store,
        &payload.name,
        &email,
        &payload.password,
        &payload.class_name,
        state.bcrypt_cost,
    )
    .await?;

    let token = state.tokens.issue(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            user: user.into(),
            token,
        }),
    ))
}

async fn login(
    State(state): State<ApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let email = payload.email.trim().to_lowercase();
    let user = service::authenticate(&state.store, &email, &payload.password).await?;

    let token = state.tokens.issue(&user)?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: user.into(),
        token,
    }))
}

async fn verify(AuthUser(user): AuthUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "user": UserResponse::from(user) }))
}
