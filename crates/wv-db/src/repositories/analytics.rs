use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::StoreResult,
    models::{AnalyticsEvent, NewAnalyticsEvent},
    store::RecordStore,
};

impl RecordStore {
    /// Append an event. Events are never updated or removed.
    pub async fn record_event(&self, new_event: NewAnalyticsEvent) -> StoreResult<AnalyticsEvent> {
        self.mutate(|doc| {
            let event = AnalyticsEvent {
                id: Uuid::now_v7(),
                user_id: new_event.user_id,
                category: new_event.category,
                action: new_event.action,
                label: new_event.label,
                value: new_event.value,
                timestamp: Utc::now(),
                user_agent: new_event.user_agent,
                ip: new_event.ip,
            };

            doc.analytics.push(event.clone());
            Ok(event)
        })
        .await
    }

    /// Events in insertion order, optionally restricted to one category
    pub async fn get_events(&self, category: Option<&str>) -> Vec<AnalyticsEvent> {
        self.read(|doc| {
            doc.analytics
                .iter()
                .filter(|e| category.is_none_or(|c| e.category == c))
                .cloned()
                .collect()
        })
        .await
    }
}
