use crate::{models::PlatformStats, store::RecordStore};

impl RecordStore {
    /// Dashboard counters over every record, inactive ones included
    pub async fn platform_stats(&self) -> PlatformStats {
        self.read(|doc| {
            let mut stats = PlatformStats {
                total_users: doc.users.len(),
                active_users: doc.users.iter().filter(|u| u.is_active).count(),
                total_resources: doc.resources.len(),
                total_downloads: doc.resources.iter().map(|r| r.download_count).sum(),
                ..Default::default()
            };

            for user in doc.users.iter().filter(|u| !u.class_name.is_empty()) {
                *stats.users_by_class.entry(user.class_name.clone()).or_default() += 1;
            }

            for resource in doc.resources.iter().filter(|r| !r.subject.is_empty()) {
                *stats
                    .resources_by_subject
                    .entry(resource.subject.clone())
                    .or_default() += 1;
            }

            stats
        })
        .await
    }
}
