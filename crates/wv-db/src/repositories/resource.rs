use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::StoreResult,
    models::{NewResource, Resource, ResourceFilter, ResourceUpdate},
    store::RecordStore,
};

impl RecordStore {
    pub async fn create_resource(&self, new_resource: NewResource) -> StoreResult<Resource> {
        self.mutate(|doc| {
            let resource = Resource {
                id: Uuid::now_v7(),
                title: new_resource.title,
                description: new_resource.description,
                subject: new_resource.subject,
                class_name: new_resource.class_name,
                kind: new_resource.kind,
                filename: new_resource.filename,
                original_name: new_resource.original_name,
                file_path: new_resource.file_path,
                file_size: new_resource.file_size,
                mime_type: new_resource.mime_type,
                is_public: new_resource.is_public,
                is_premium: new_resource.is_premium,
                uploaded_by: new_resource.uploaded_by,
                download_count: 0,
                created_at: Utc::now(),
                is_active: true,
            };

            doc.resources.push(resource.clone());
            Ok(resource)
        })
        .await
    }

    /// Active resources matching every filter that is set
    pub async fn get_resources(&self, filter: &ResourceFilter) -> Vec<Resource> {
        self.read(|doc| {
            doc.resources
                .iter()
                .filter(|r| r.is_active && filter.matches(r))
                .cloned()
                .collect()
        })
        .await
    }

    /// Active resource by ID
    pub async fn get_resource(&self, resource_id: Uuid) -> Option<Resource> {
        self.read(|doc| {
            doc.resources
                .iter()
                .find(|r| r.is_active && r.id == resource_id)
                .cloned()
        })
        .await
    }

    /// Case-insensitive substring search over title, description and subject
    pub async fn search_resources(&self, query: &str, filter: &ResourceFilter) -> Vec<Resource> {
        let needle = query.trim().to_lowercase();

        self.read(|doc| {
            doc.resources
                .iter()
                .filter(|r| r.is_active && filter.matches(r))
                .filter(|r| {
                    r.title.to_lowercase().contains(&needle)
                        || r.subject.to_lowercase().contains(&needle)
                        || r.description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(&needle))
                })
                .cloned()
                .collect()
        })
        .await
    }

    /// Merge `update` into the resource, inactive ones included
    pub async fn update_resource(
        &self,
        resource_id: Uuid,
        update: ResourceUpdate,
    ) -> StoreResult<Option<Resource>> {
        self.mutate_existing(|doc| {
            let Some(resource) = doc.resources.iter_mut().find(|r| r.id == resource_id) else {
                return Ok(None);
            };
            update.apply(resource);
            Ok(Some(resource.clone()))
        })
        .await
    }

    /// Bump the download counter of an active resource
    pub async fn record_download(&self, resource_id: Uuid) -> StoreResult<Option<Resource>> {
        self.mutate_existing(|doc| {
            let Some(resource) = doc
                .resources
                .iter_mut()
                .find(|r| r.is_active && r.id == resource_id)
            else {
                return Ok(None);
            };
            resource.download_count += 1;
            Ok(Some(resource.clone()))
        })
        .await
    }

    /// Soft delete
    pub async fn deactivate_resource(&self, resource_id: Uuid) -> StoreResult<Option<Resource>> {
        self.update_resource(
            resource_id,
            ResourceUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }
}
