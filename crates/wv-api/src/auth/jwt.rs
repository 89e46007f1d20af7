use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wv_db::models::User;

use crate::error::ApiError;

/// Upper bound for `JWT_EXPIRY_DAYS`
pub const MAX_VALIDITY_DAYS: i64 = 3650;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
#[error("JWT expiry must be between 1 and {max} days, got {0}", max = MAX_VALIDITY_DAYS)]
pub struct InvalidValidity(pub i64);

/// HS256 signing keys plus the token lifetime, built once at startup
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validity: TimeDelta,
}

impl TokenSigner {
    pub fn new(secret: &str, validity_days: i64) -> Result<Self, InvalidValidity> {
        let validity = Some(validity_days)
            .filter(|days| (1..=MAX_VALIDITY_DAYS).contains(days))
            .and_then(TimeDelta::try_days)
            .ok_or(InvalidValidity(validity_days))?;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validity,
        })
    }

    pub const fn validity(&self) -> TimeDelta {
        self.validity
    }

    /// Mint a token whose `sub` is the user id
    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
        };

        Ok(jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| ApiError::InvalidToken("Invalid or expired token".to_string()))
    }
}
