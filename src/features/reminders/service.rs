//! Reminder service
//!
//! The public API of the reminders feature, consumed by the command layer:
//! create, list, delete, clear. Persistence goes through the store; the
//! scheduler is told about anything that affects its in-memory queues.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Deletes purge the scheduler queues, not just storage
//! - 1.0.0: Initial implementation

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use thiserror::Error;

use super::duration::{DurationError, DurationSpec};
use super::reminder::Reminder;
use super::scheduler::SchedulerHandle;
use super::store::ReminderStore;

/// Why a create call failed.
#[derive(Debug, Error)]
pub enum CreateError {
    /// The duration text did not parse; show the message to the user as-is.
    #[error(transparent)]
    Duration(#[from] DurationError),
    /// The store misbehaved.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Result of a targeted delete.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Create, list, delete, and clear reminders.
#[derive(Clone)]
pub struct ReminderService {
    store: ReminderStore,
    scheduler: SchedulerHandle,
    window_secs: i64,
}

impl ReminderService {
    pub fn new(
        store: ReminderStore,
        scheduler: SchedulerHandle,
        window_secs: i64,
    ) -> ReminderService {
        ReminderService {
            store,
            scheduler,
            window_secs,
        }
    }

    /// Parse `input` and persist the resulting reminder. One that already
    /// fires within the current promotion window goes straight to the soon
    /// tier and is handed to the scheduler.
    pub async fn create(
        &self,
        owner_id: &str,
        channel_id: &str,
        input: &str,
    ) -> Result<Reminder, CreateError> {
        self.create_at(owner_id, channel_id, input, Utc::now().timestamp())
            .await
    }

    /// `create` with an explicit clock, so tests can pin time.
    pub async fn create_at(
        &self,
        owner_id: &str,
        channel_id: &str,
        input: &str,
        now: i64,
    ) -> Result<Reminder, CreateError> {
        let spec = DurationSpec::parse(input, now)?;
        let reminder = Reminder::new(owner_id, channel_id, &spec, now);

        if reminder.fire_at - now < self.window_secs {
            self.store.insert_soon(&reminder).await?;
            self.scheduler.promote(reminder.clone());
        } else {
            self.store.insert_active(&reminder).await?;
        }

        info!(
            "Created reminder {} for user {owner_id} (fires in {}s)",
            reminder.tag,
            reminder.fire_at - now
        );
        Ok(reminder)
    }

    /// The user's pending reminders, soonest first.
    pub async fn list(&self, owner_id: &str) -> Result<Vec<Reminder>> {
        let mut reminders = Vec::new();
        for tag in self.store.user_tags(owner_id).await? {
            match self.store.get(&tag).await {
                Ok(Some(reminder)) => reminders.push(reminder),
                Ok(None) => {
                    warn!("User {owner_id} index references missing reminder {tag}");
                    self.store.drop_user_tag(owner_id, &tag).await?;
                }
                Err(e) => warn!("Skipping unreadable reminder {tag}: {e:#}"),
            }
        }
        reminders.sort_by_key(|r| r.fire_at);
        Ok(reminders)
    }

    /// Delete one reminder by tag. Only the owner's own reminders are
    /// visible to this call; anything else reports `NotFound`.
    pub async fn delete(&self, owner_id: &str, tag: &str) -> Result<DeleteOutcome> {
        let Some(reminder) = self.store.get(tag).await? else {
            return Ok(DeleteOutcome::NotFound);
        };
        if reminder.owner_id != owner_id {
            return Ok(DeleteOutcome::NotFound);
        }

        self.store.remove(&reminder).await?;
        self.scheduler.forget(tag);
        info!("Deleted reminder {tag} for user {owner_id}");
        Ok(DeleteOutcome::Deleted)
    }

    /// Delete every reminder of one user; returns how many went away.
    /// Clearing an empty slate is not an error.
    pub async fn clear(&self, owner_id: &str) -> Result<usize> {
        let mut deleted = 0;
        for tag in self.store.user_tags(owner_id).await? {
            match self.store.get(&tag).await? {
                Some(reminder) => {
                    self.store.remove(&reminder).await?;
                    deleted += 1;
                }
                None => self.store.drop_user_tag(owner_id, &tag).await?,
            }
        }
        self.scheduler.forget_all(owner_id);
        if deleted > 0 {
            info!("Cleared {deleted} reminder(s) for user {owner_id}");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::dispatcher::{ChatClient, DispatchError, Dispatcher};
    use crate::features::reminders::scheduler::ReminderScheduler;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    const NOW: i64 = 1_700_000_000;
    const WINDOW: i64 = 120;

    #[derive(Default)]
    struct RecordingChat {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ChatClient for RecordingChat {
        async fn send_message(&self, channel_id: &str, text: &str) -> Result<(), DispatchError> {
            self.sent
                .lock()
                .unwrap()
                .push((channel_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn harness() -> (ReminderService, ReminderScheduler, ReminderStore) {
        let store = ReminderStore::new(Arc::new(MemoryStore::new()));
        let (scheduler, handle) = ReminderScheduler::new(store.clone(), WINDOW);
        let service = ReminderService::new(store.clone(), handle, WINDOW);
        (service, scheduler, store)
    }

    #[tokio::test]
    async fn test_create_far_future_goes_to_active_tier() {
        let (service, _scheduler, store) = harness();
        let r = service
            .create_at("111", "222", "3 days to walk the dog", NOW)
            .await
            .unwrap();

        assert_eq!(r.body, "walk the dog");
        assert_eq!(r.fire_at, NOW + 3 * 86400);
        assert_eq!(store.active_reminders().await.unwrap().len(), 1);
        assert!(store.soon_reminders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_within_window_goes_to_soon_tier() {
        let (service, _scheduler, store) = harness();
        service
            .create_at("111", "222", "30 seconds stretch", NOW)
            .await
            .unwrap();

        assert!(store.active_reminders().await.unwrap().is_empty());
        assert_eq!(store.soon_reminders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_surfaces_parse_errors() {
        let (service, _scheduler, _store) = harness();
        let err = service
            .create_at("111", "222", "do the thing", NOW)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CreateError::Duration(DurationError::NoDurationFound)
        ));
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_fire_time() {
        let (service, _scheduler, _store) = harness();
        service
            .create_at("111", "222", "2 days later", NOW)
            .await
            .unwrap();
        service
            .create_at("111", "222", "1 hour sooner", NOW)
            .await
            .unwrap();
        service
            .create_at("999", "222", "1 day not mine", NOW)
            .await
            .unwrap();

        let listed = service.list("111").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].body, "sooner");
        assert_eq!(listed[1].body, "later");
    }

    #[tokio::test]
    async fn test_delete_unknown_tag_reports_not_found() {
        let (service, _scheduler, _store) = harness();
        assert_eq!(
            service.delete("111", "nope1234").await.unwrap(),
            DeleteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_delete_enforces_ownership() {
        let (service, _scheduler, _store) = harness();
        let r = service
            .create_at("111", "222", "1 day mine", NOW)
            .await
            .unwrap();

        assert_eq!(
            service.delete("999", &r.tag).await.unwrap(),
            DeleteOutcome::NotFound
        );
        assert_eq!(
            service.delete("111", &r.tag).await.unwrap(),
            DeleteOutcome::Deleted
        );
        assert!(service.list("111").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_on_empty_slate_is_ok() {
        let (service, _scheduler, _store) = harness();
        assert_eq!(service.clear("111").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear_removes_all_for_owner() {
        let (service, _scheduler, _store) = harness();
        service.create_at("111", "222", "1 day a", NOW).await.unwrap();
        service.create_at("111", "222", "2 days b", NOW).await.unwrap();
        service.create_at("999", "222", "1 day c", NOW).await.unwrap();

        assert_eq!(service.clear("111").await.unwrap(), 2);
        assert!(service.list("111").await.unwrap().is_empty());
        assert_eq!(service.list("999").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_end_to_end_create_promote_dispatch() {
        let (service, mut scheduler, _store) = harness();
        let chat = Arc::new(RecordingChat::default());
        let dispatcher = Dispatcher::new(chat.clone());

        service
            .create_at("111", "222", "2 seconds feed the cat", NOW)
            .await
            .unwrap();

        // Tick the clock past the fire time.
        for (tick, now) in [(0, NOW), (1, NOW + 1), (2, NOW + 2), (3, NOW + 3)] {
            scheduler.handle_tick(&dispatcher, tick, now).await;
        }

        let sent = chat.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "222");
        assert!(sent[0].1.contains("<@111>"));
        assert!(sent[0].1.contains("feed the cat"));
        drop(sent);

        assert!(service.list("111").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_reminder_never_fires() {
        let (service, mut scheduler, _store) = harness();
        let chat = Arc::new(RecordingChat::default());
        let dispatcher = Dispatcher::new(chat.clone());

        let r = service
            .create_at("111", "222", "2 seconds nope", NOW)
            .await
            .unwrap();
        scheduler.handle_tick(&dispatcher, 0, NOW).await;

        // Promoted already; delete must still stop it.
        service.delete("111", &r.tag).await.unwrap();
        scheduler.handle_tick(&dispatcher, 1, NOW + 5).await;

        assert!(chat.sent.lock().unwrap().is_empty());
    }
}
