use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role, stored lowercase on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Premium,
    Admin,
}

impl Role {
    /// Whether this role may download premium resources
    pub const fn has_premium_access(self) -> bool {
        matches!(self, Self::Premium | Self::Admin)
    }
}

/// User model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier, assigned at creation
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Login email, unique across all users (active or not)
    pub email: String,
    /// Bcrypt hash of the password
    #[serde(rename = "password")]
    pub password_hash: String,
    /// Class/grade label (e.g. "10")
    pub class_name: String,
    /// Account role
    #[serde(default)]
    pub role: Role,
    /// When the user was created
    pub created_at: DateTime<Utc>,
    /// Last successful login (null until the first one)
    pub last_login: Option<DateTime<Utc>>,
    /// Soft-deactivation flag
    pub is_active: bool,
}

/// Fields supplied by the caller when creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub class_name: String,
    pub role: Role,
}

/// Partial user update, only `Some` fields are merged
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub class_name: Option<String>,
    pub role: Option<Role>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl UserUpdate {
    pub(crate) fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(class_name) = self.class_name {
            user.class_name = class_name;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(last_login) = self.last_login {
            user.last_login = Some(last_login);
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
    }
}

/// Study material metadata. The file bytes live on disk at `file_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Unique resource identifier
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub subject: String,
    /// Class label this resource targets
    #[serde(rename = "class")]
    pub class_name: String,
    /// Type tag (pdf, video, notes...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Generated unique name on disk
    pub filename: String,
    /// Name the file was uploaded with
    pub original_name: String,
    pub file_path: String,
    /// Size in bytes
    pub file_size: u64,
    pub mime_type: String,
    pub is_public: bool,
    pub is_premium: bool,
    /// User ID of the uploader
    pub uploaded_by: Uuid,
    /// Number of downloads, only ever incremented
    pub download_count: u64,
    pub created_at: DateTime<Utc>,
    /// Soft-delete flag
    pub is_active: bool,
}

/// Fields supplied by the caller when creating a resource
#[derive(Debug, Clone)]
pub struct NewResource {
    pub title: String,
    pub description: Option<String>,
    pub subject: String,
    pub class_name: String,
    pub kind: String,
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub file_size: u64,
    pub mime_type: String,
    pub is_public: bool,
    pub is_premium: bool,
    pub uploaded_by: Uuid,
}

/// Partial resource update
#[derive(Debug, Clone, Default)]
pub struct ResourceUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub class_name: Option<String>,
    pub kind: Option<String>,
    pub is_public: Option<bool>,
    pub is_premium: Option<bool>,
    pub is_active: Option<bool>,
}

impl ResourceUpdate {
    pub(crate) fn apply(self, resource: &mut Resource) {
        if let Some(title) = self.title {
            resource.title = title;
        }
        if let Some(description) = self.description {
            resource.description = Some(description);
        }
        if let Some(subject) = self.subject {
            resource.subject = subject;
        }
        if let Some(class_name) = self.class_name {
            resource.class_name = class_name;
        }
        if let Some(kind) = self.kind {
            resource.kind = kind;
        }
        if let Some(is_public) = self.is_public {
            resource.is_public = is_public;
        }
        if let Some(is_premium) = self.is_premium {
            resource.is_premium = is_premium;
        }
        if let Some(is_active) = self.is_active {
            resource.is_active = is_active;
        }
    }
}

/// Equality filters over active resources, combined with AND
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceFilter {
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    pub subject: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl ResourceFilter {
    pub fn matches(&self, resource: &Resource) -> bool {
        let eq = |filter: &Option<String>, value: &str| {
            filter.as_deref().is_none_or(|f| f == value)
        };

        eq(&self.class_name, &resource.class_name)
            && eq(&self.subject, &resource.subject)
            && eq(&self.kind, &resource.kind)
    }
}

/// Per-subject progress of one user. Unique on (user_id, subject).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    /// Owner of this entry
    pub user_id: Uuid,
    pub subject: String,
    pub topic: Option<String>,
    /// Completion percentage, 0-100
    pub percentage: u8,
    /// Time spent, in seconds
    pub time_spent: u64,
    pub updated_at: DateTime<Utc>,
}

/// Payload for a progress upsert
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub subject: String,
    pub topic: Option<String>,
    /// Must already be clamped to 0-100 by the caller
    pub percentage: u8,
    pub time_spent: u64,
}

/// Announcement model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    /// Type tag ("info", "warning"...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Only shown to this class when set
    pub target_class: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    pub title: String,
    pub message: String,
    pub kind: String,
    pub target_class: Option<String>,
    pub created_by: Uuid,
}

/// Append-only analytics record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub id: Uuid,
    /// Actor that triggered the event
    pub user_id: Uuid,
    pub category: String,
    pub action: String,
    pub label: Option<String>,
    #[serde(default)]
    pub value: i64,
    pub timestamp: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAnalyticsEvent {
    pub user_id: Uuid,
    pub category: String,
    pub action: String,
    pub label: Option<String>,
    pub value: i64,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

/// The whole persisted document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub progress: Vec<ProgressEntry>,
    #[serde(default)]
    pub announcements: Vec<Announcement>,
    #[serde(default)]
    pub analytics: Vec<AnalyticsEvent>,
}

/// Admin dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_users: usize,
    pub active_users: usize,
    pub total_resources: usize,
    pub total_downloads: u64,
    pub users_by_class: BTreeMap<String, usize>,
    pub resources_by_subject: BTreeMap<String, usize>,
}
