use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::StoreResult,
    models::{ProgressEntry, ProgressUpdate},
    store::RecordStore,
};

impl RecordStore {
    /// Upsert the (user, subject) entry. The whole entry is replaced.
    pub async fn update_progress(
        &self,
        user_id: Uuid,
        update: ProgressUpdate,
    ) -> StoreResult<ProgressEntry> {
        self.mutate(|doc| {
            let entry = ProgressEntry {
                user_id,
                subject: update.subject,
                topic: update.topic,
                percentage: update.percentage,
                time_spent: update.time_spent,
                updated_at: Utc::now(),
            };

            match doc
                .progress
                .iter_mut()
                .find(|p| p.user_id == user_id && p.subject == entry.subject)
            {
                Some(existing) => *existing = entry.clone(),
                None => doc.progress.push(entry.clone()),
            }

            Ok(entry)
        })
        .await
    }

    pub async fn get_user_progress(&self, user_id: Uuid) -> Vec<ProgressEntry> {
        self.read(|doc| {
            doc.progress
                .iter()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect()
        })
        .await
    }
}
