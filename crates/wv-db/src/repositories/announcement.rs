use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::StoreResult,
    models::{Announcement, NewAnnouncement},
    store::RecordStore,
};

impl RecordStore {
    pub async fn create_announcement(
        &self,
        new_announcement: NewAnnouncement,
    ) -> StoreResult<Announcement> {
        self.mutate(|doc| {
            let announcement = Announcement {
                id: Uuid::now_v7(),
                title: new_announcement.title,
                message: new_announcement.message,
                kind: new_announcement.kind,
                target_class: new_announcement.target_class,
                created_by: new_announcement.created_by,
                created_at: Utc::now(),
                is_active: true,
            };

            doc.announcements.push(announcement.clone());
            Ok(announcement)
        })
        .await
    }

    /// Active announcements, newest first.
    ///
    /// With a class, untargeted announcements are kept along with the ones
    /// targeting that class.
    pub async fn get_announcements(&self, class_name: Option<&str>) -> Vec<Announcement> {
        let mut announcements: Vec<Announcement> = self
            .read(|doc| {
                doc.announcements
                    .iter()
                    .filter(|a| a.is_active)
                    .filter(|a| match (class_name, a.target_class.as_deref()) {
                        (Some(class_name), Some(target)) => class_name == target,
                        _ => true,
                    })
                    .cloned()
                    .collect()
            })
            .await;

        announcements.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        announcements
    }

    /// Soft delete
    pub async fn deactivate_announcement(
        &self,
        announcement_id: Uuid,
    ) -> StoreResult<Option<Announcement>> {
        self.mutate_existing(|doc| {
            let Some(announcement) = doc
                .announcements
                .iter_mut()
                .find(|a| a.id == announcement_id)
            else {
                return Ok(None);
            };
            announcement.is_active = false;
            Ok(Some(announcement.clone()))
        })
        .await
    }
}
