use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use super::require_user;
use crate::{
    db::CatalogStore,
    error::AppResult,
    models::{EventType, FeedEvent, NewFeedEvent, Operation, UserId},
};

/// Append-only per-user activity log
///
/// Timestamps come from a process-wide clock that never repeats or goes
/// backwards: each append takes the later of wall-clock milliseconds and one
/// past the previous timestamp.
pub struct FeedLog {
    store: Arc<dyn CatalogStore>,
    last_timestamp: AtomicI64,
}

impl FeedLog {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            last_timestamp: AtomicI64::new(0),
        }
    }

    fn next_timestamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last_timestamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }

    /// Records one event; never deduplicated or retried
    pub async fn append(
        &self,
        user_id: UserId,
        event_type: EventType,
        operation: Operation,
        entity_id: i64,
    ) -> AppResult<FeedEvent> {
        let event = self
            .store
            .append_event(NewFeedEvent {
                user_id,
                event_type,
                operation,
                entity_id,
                timestamp: self.next_timestamp(),
            })
            .await?;

        tracing::debug!(
            user_id,
            event_id = event.event_id,
            event_type = %event.event_type,
            operation = %event.operation,
            entity_id,
            "Feed event appended"
        );

        Ok(event)
    }

    /// The user's events, oldest first
    pub async fn feed_of(&self, user_id: UserId) -> AppResult<Vec<FeedEvent>> {
        require_user(self.store.as_ref(), user_id).await?;
        self.store.feed_of(user_id).await
    }
}
