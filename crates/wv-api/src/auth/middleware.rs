use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use wv_db::models::{Role, User};

use crate::{ApiState, error::ApiError};

/// Authenticated user extractor
///
/// Reads the `Authorization: Bearer <token>` header, verifies the token and
/// loads the user from the store. Inactive users are rejected.
///
/// # Example
/// ```
/// use wv_api::{auth::AuthUser, error::ApiError};
///
/// async fn protected_route(AuthUser(user): AuthUser) -> Result<String, ApiError> {
///     Ok(user.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<ApiState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Auth("Access token required".to_string()))?;

        let claims = state.tokens.verify(bearer.token())?;

        let user = state
            .store
            .get_user_by_id(claims.sub)
            .await
            .filter(|u| u.is_active)
            .ok_or_else(|| ApiError::Auth("Invalid token".to_string()))?;

        Ok(Self(user))
    }
}

/// Like [`AuthUser`], but only admins get through
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequestParts<ApiState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if user.role != Role::Admin {
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }

        Ok(Self(user))
    }
}
