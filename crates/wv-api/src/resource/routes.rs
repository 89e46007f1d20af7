use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tokio::fs;
use uuid::Uuid;
use wv_db::models::{NewResource, Resource, ResourceFilter};

use super::storage::DEFAULT_CATEGORY;
use crate::{
    ApiState,
    auth::{AdminUser, AuthUser},
    error::ApiError,
    validation::{validate_required, validate_search_query},
};

/// Create the resource routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/resources", get(list_resources))
        .route(
            "/resources/upload",
            // Size is enforced while reading the file field
            post(upload_resource).layer(DefaultBodyLimit::disable()),
        )
        .route("/resources/{id}/download", get(download_resource))
        .route("/resources/{id}", delete(delete_resource))
        .route("/search", get(search_resources))
}

async fn list_resources(
    _auth: AuthUser,
    State(state): State<ApiState>,
    Query(filter): Query<ResourceFilter>,
) -> Json<Vec<Resource>> {
    Json(state.store.get_resources(&filter).await)
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
    class: Option<String>,
    subject: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

async fn search_resources(
    _auth: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Resource>>, ApiError> {
    let term = validate_search_query(query.q.as_deref())?;

    let filter = ResourceFilter {
        class_name: query.class,
        subject: query.subject,
        kind: query.kind,
    };

    Ok(Json(state.store.search_resources(term, &filter).await))
}

/// Text fields and the file collected from the upload form
#[derive(Debug, Default)]
struct UploadForm {
    title: Option<String>,
    description: Option<String>,
    subject: Option<String>,
    class_name: Option<String>,
    kind: Option<String>,
    category: Option<String>,
    is_public: bool,
    is_premium: bool,
    file: Option<UploadedFile>,
}

#[derive(Debug)]
struct UploadedFile {
    original_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

#[derive(Serialize)]
struct UploadResponse {
    message: String,
    resource: Resource,
}

async fn read_upload_form(
    state: &ApiState,
    mut multipart: Multipart,
) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "file" {
            let original_name = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| ApiError::Upload("No file uploaded".to_string()))?;
            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();

            let mut bytes = Vec::new();
            while let Some(chunk) = field.chunk().await? {
                state.uploads.check_size(bytes.len() + chunk.len())?;
                bytes.extend_from_slice(&chunk);
            }

            form.file = Some(UploadedFile {
                original_name,
                mime_type,
                bytes,
            });
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "title" => form.title = Some(value),
            "description" => form.description = Some(value).filter(|d| !d.trim().is_empty()),
            "subject" => form.subject = Some(value),
            "className" => form.class_name = Some(value),
            "type" => form.kind = Some(value),
            "category" => form.category = Some(value).filter(|c| !c.trim().is_empty()),
            "isPublic" => form.is_public = value == "true",
            "isPremium" => form.is_premium = value == "true",
            other => tracing::debug!("Ignoring unknown upload field {other}"),
        }
    }

    Ok(form)
}

fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
    let value = value.unwrap_or_default();
    validate_required(field, &value, 200)?;
    Ok(value.trim().to_string())
}

async fn upload_resource(
    AdminUser(admin): AdminUser,
    State(state): State<ApiState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let form = read_upload_form(&state, multipart).await?;

    let file = form
        .file
        .ok_or_else(|| ApiError::Upload("No file uploaded".to_string()))?;
    let title = required("Title", form.title)?;
    let subject = required("Subject", form.subject)?;
    let class_name = required("Class", form.class_name)?;
    let category = form
        .category
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let kind = form.kind.unwrap_or_else(|| category.clone());

    let stored = state
        .uploads
        .store(&category, &file.original_name, &file.bytes)
        .await?;

    // A failed write leaves the record live in memory, so the file stays too
    let resource = state
        .store
        .create_resource(NewResource {
            title,
            description: form.description,
            subject,
            class_name,
            kind,
            filename: stored.filename,
            original_name: file.original_name,
            file_path: stored.path.to_string_lossy().into_owned(),
            file_size: stored.size,
            mime_type: file.mime_type,
            is_public: form.is_public,
            is_premium: form.is_premium,
            uploaded_by: admin.id,
        })
        .await?;

    tracing::info!(resource_id = %resource.id, uploaded_by = %admin.id, "Resource uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Resource uploaded successfully".to_string(),
            resource,
        }),
    ))
}

async fn download_resource(
    AuthUser(user): AuthUser,
    State(state): State<ApiState>,
    Path(resource_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let resource = state
        .store
        .get_resource(resource_id)
        .await
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    if resource.is_premium && !user.role.has_premium_access() {
        return Err(ApiError::Forbidden("Premium access required".to_string()));
    }

    let bytes = match fs::read(&resource.file_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound("File not found on server".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    state.store.record_download(resource_id).await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        resource.original_name.replace(['"', '\\'], "_")
    );

    Ok((
        [
            (header::CONTENT_TYPE, resource.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn delete_resource(
    _admin: AdminUser,
    State(state): State<ApiState>,
    Path(resource_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store
        .deactivate_resource(resource_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    Ok(Json(serde_json::json!({
        "message": "Resource deleted successfully",
        "id": resource_id
    })))
}
