use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{StoreError, StoreResult},
    models::{NewUser, User, UserUpdate},
    store::RecordStore,
};

impl RecordStore {
    /// Create a user, rejecting an email that is already taken
    pub async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        self.mutate(|doc| {
            if doc.users.iter().any(|u| u.email == new_user.email) {
                return Err(StoreError::DuplicateEmail(new_user.email));
            }

            let user = User {
                id: Uuid::now_v7(),
                name: new_user.name,
                email: new_user.email,
                password_hash: new_user.password_hash,
                class_name: new_user.class_name,
                role: new_user.role,
                created_at: Utc::now(),
                last_login: None,
                is_active: true,
            };

            doc.users.push(user.clone());
            Ok(user)
        })
        .await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Option<User> {
        self.read(|doc| doc.users.iter().find(|u| u.email == email).cloned())
            .await
    }

    pub async fn get_user_by_id(&self, user_id: Uuid) -> Option<User> {
        self.read(|doc| doc.users.iter().find(|u| u.id == user_id).cloned())
            .await
    }

    /// Merge `update` into the user. `Ok(None)` when no such user exists.
    pub async fn update_user(
        &self,
        user_id: Uuid,
        update: UserUpdate,
    ) -> StoreResult<Option<User>> {
        self.mutate_existing(|doc| {
            let Some(index) = doc.users.iter().position(|u| u.id == user_id) else {
                return Ok(None);
            };

            if let Some(email) = &update.email {
                if doc.users.iter().any(|u| u.id != user_id && &u.email == email) {
                    return Err(StoreError::DuplicateEmail(email.clone()));
                }
            }

            let user = &mut doc.users[index];
            update.apply(user);
            Ok(Some(user.clone()))
        })
        .await
    }

    /// All users, active or not, in creation order
    pub async fn list_users(&self) -> Vec<User> {
        self.read(|doc| doc.users.clone()).await
    }
}
