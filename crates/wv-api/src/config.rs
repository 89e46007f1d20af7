use std::{fmt, path::PathBuf};

use serde::Deserialize;

/// Deployment environment, read from `ENV`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

/// Server configuration, deserialized from environment variables
/// (`PORT`, `DB_PATH`, `JWT_SECRET`, ...)
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Location of the JSON database
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Root directory for uploaded files
    #[serde(default = "default_upload_path")]
    pub upload_path: PathBuf,
    /// Upload size limit in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiry_days")]
    pub jwt_expiry_days: i64,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    /// No default admin is seeded when unset
    pub admin_password: Option<String>,
    /// Set only behind a reverse proxy that overwrites `X-Forwarded-For`
    #[serde(default)]
    pub trust_proxy: bool,
    #[serde(default)]
    pub env: Environment,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<Self>()
    }
}

const fn default_port() -> u16 {
    3000
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/db.json")
}

fn default_upload_path() -> PathBuf {
    PathBuf::from("public/uploads")
}

const fn default_max_file_size() -> usize {
    50 * 1024 * 1024
}

const fn default_jwt_expiry_days() -> i64 {
    7
}

const fn default_bcrypt_cost() -> u32 {
    12
}

fn default_admin_email() -> String {
    "admin@waizvault.com".to_string()
}
