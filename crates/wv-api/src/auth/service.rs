use chrono::Utc;
use wv_db::{
    RecordStore,
    models::{NewUser, Role, User, UserUpdate},
};

use crate::{error::ApiError, metrics::record_auth_event};

/// Runs bcrypt on the blocking thread pool
pub async fn hash_password(password: &str, bcrypt_cost: u32) -> Result<String, ApiError> {
    let password = password.to_owned();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt_cost)).await??;
    Ok(hash)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, ApiError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid =
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash)).await??;
    Ok(valid)
}

/// Create a student account.
///
/// Duplicate emails are rejected up front; the store guards the same
/// invariant for concurrent registrations.
pub async fn register_user(
    store: &RecordStore,
    name: &str,
    email: &str,
    password: &str,
    class_name: &str,
    bcrypt_cost: u32,
) -> Result<User, ApiError> {
    if store.get_user_by_email(email).await.is_some() {
        record_auth_event("register", false);
        return Err(ApiError::Validation("User already exists".to_string()));
    }

    let password_hash = hash_password(password, bcrypt_cost).await?;

    let user = store
        .create_user(NewUser {
            name: name.trim().to_string(),
            email: email.to_string(),
            password_hash,
            class_name: class_name.trim().to_string(),
            role: Role::Student,
        })
        .await?;

    record_auth_event("register", true);
    tracing::info!(user_id = %user.id, "User registered");

    Ok(user)
}

/// Check credentials and stamp `last_login`
pub async fn authenticate(
    store: &RecordStore,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    let invalid = || ApiError::Auth("Invalid credentials".to_string());

    let Some(user) = store.get_user_by_email(email).await.filter(|u| u.is_active) else {
        record_auth_event("login", false);
        return Err(invalid());
    };

    if !verify_password(password, &user.password_hash).await? {
        record_auth_event("login", false);
        return Err(invalid());
    }

    let user = store
        .update_user(
            user.id,
            UserUpdate {
                last_login: Some(Utc::now()),
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(invalid)?;

    record_auth_event("login", true);
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(user)
}

/// Seed an admin account on first start.
///
/// Returns the created user, or `None` when an account with that email
/// already exists.
pub async fn ensure_default_admin(
    store: &RecordStore,
    email: &str,
    password: &str,
    bcrypt_cost: u32,
) -> Result<Option<User>, ApiError> {
    if store.get_user_by_email(email).await.is_some() {
        return Ok(None);
    }

    let password_hash = hash_password(password, bcrypt_cost).await?;

    let admin = store
        .create_user(NewUser {
            name: "Admin User".to_string(),
            email: email.to_string(),
            password_hash,
            class_name: "admin".to_string(),
            role: Role::Admin,
        })
        .await?;

    tracing::warn!(
        email = %admin.email,
        "Default admin user created, change the password after first login"
    );

    Ok(Some(admin))
}
