//! Typed reminder persistence over the key-value store
//!
//! Key layout:
//! - `reminder:{tag}` — the reminder record
//! - `reminders:active` — tags waiting outside the promotion window
//! - `reminders:soon` — tags promoted for the current window
//! - `reminders:user:{owner_id}` — every pending tag of one user
//!
//! A tag lives in exactly one of the two tier sets, and in its owner's
//! index for as long as it is pending.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0

use anyhow::Result;
use log::warn;
use std::sync::Arc;

use crate::store::KvStore;

use super::reminder::Reminder;

const ACTIVE_SET: &str = "reminders:active";
const SOON_SET: &str = "reminders:soon";

fn record_key(tag: &str) -> String {
    format!("reminder:{tag}")
}

fn user_key(owner_id: &str) -> String {
    format!("reminders:user:{owner_id}")
}

/// Reminder-shaped operations over the raw key-value store.
#[derive(Clone)]
pub struct ReminderStore {
    kv: Arc<dyn KvStore>,
}

impl ReminderStore {
    pub fn new(kv: Arc<dyn KvStore>) -> ReminderStore {
        ReminderStore { kv }
    }

    /// Persist a new reminder into the active (far-future) tier.
    pub async fn insert_active(&self, reminder: &Reminder) -> Result<()> {
        self.insert(reminder, ACTIVE_SET).await
    }

    /// Persist a new reminder straight into the soon tier; used when it
    /// already fires within the current promotion window.
    pub async fn insert_soon(&self, reminder: &Reminder) -> Result<()> {
        self.insert(reminder, SOON_SET).await
    }

    async fn insert(&self, reminder: &Reminder, tier: &str) -> Result<()> {
        self.kv
            .put_record(&record_key(&reminder.tag), reminder.to_record())
            .await?;
        self.kv.add_to_set(tier, &reminder.tag).await?;
        self.kv
            .add_to_set(&user_key(&reminder.owner_id), &reminder.tag)
            .await
    }

    /// Move a tag from the active tier to the soon tier.
    pub async fn promote(&self, tag: &str) -> Result<()> {
        self.kv.remove_from_set(ACTIVE_SET, tag).await?;
        self.kv.add_to_set(SOON_SET, tag).await
    }

    /// The reminder stored under `tag`, if any.
    pub async fn get(&self, tag: &str) -> Result<Option<Reminder>> {
        match self.kv.get_record(&record_key(tag)).await? {
            Some(fields) => Ok(Some(Reminder::from_record(&fields)?)),
            None => Ok(None),
        }
    }

    /// Every reminder in the active tier.
    pub async fn active_reminders(&self) -> Result<Vec<Reminder>> {
        self.hydrate_tier(ACTIVE_SET).await
    }

    /// Every reminder in the soon tier (restart recovery reads this).
    pub async fn soon_reminders(&self) -> Result<Vec<Reminder>> {
        self.hydrate_tier(SOON_SET).await
    }

    /// Load every record a tier set references. Dangling or unreadable
    /// entries are dropped from the set and skipped.
    async fn hydrate_tier(&self, tier: &str) -> Result<Vec<Reminder>> {
        let mut reminders = Vec::new();
        for tag in self.kv.members_of(tier).await? {
            match self.kv.get_record(&record_key(&tag)).await {
                Ok(Some(fields)) => match Reminder::from_record(&fields) {
                    Ok(reminder) => reminders.push(reminder),
                    Err(e) => {
                        warn!("Dropping unreadable reminder {tag} from {tier}: {e:#}");
                        self.kv.remove_from_set(tier, &tag).await?;
                    }
                },
                Ok(None) => {
                    warn!("Dropping dangling reminder {tag} from {tier}");
                    self.kv.remove_from_set(tier, &tag).await?;
                }
                Err(e) => warn!("Skipping reminder {tag} in {tier}: {e:#}"),
            }
        }
        Ok(reminders)
    }

    /// Every pending tag of one user.
    pub async fn user_tags(&self, owner_id: &str) -> Result<Vec<String>> {
        self.kv.members_of(&user_key(owner_id)).await
    }

    /// Drop one tag from a user's index without touching anything else;
    /// used to heal a stale index entry.
    pub async fn drop_user_tag(&self, owner_id: &str, tag: &str) -> Result<()> {
        self.kv.remove_from_set(&user_key(owner_id), tag).await
    }

    /// Remove a reminder everywhere: record, both tier sets, user index.
    pub async fn remove(&self, reminder: &Reminder) -> Result<()> {
        self.kv.delete_record(&record_key(&reminder.tag)).await?;
        self.kv.remove_from_set(ACTIVE_SET, &reminder.tag).await?;
        self.kv.remove_from_set(SOON_SET, &reminder.tag).await?;
        self.kv
            .remove_from_set(&user_key(&reminder.owner_id), &reminder.tag)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::duration::DurationSpec;
    use crate::store::MemoryStore;

    fn store() -> ReminderStore {
        ReminderStore::new(Arc::new(MemoryStore::new()))
    }

    fn reminder(owner: &str, fire_at: i64) -> Reminder {
        let spec = DurationSpec::from_stored(fire_at, "water the plants");
        Reminder::new(owner, "42", &spec, fire_at - 60)
    }

    #[tokio::test]
    async fn test_insert_active_and_hydrate() {
        let store = store();
        let r = reminder("1", 1000);
        store.insert_active(&r).await.unwrap();

        let active = store.active_reminders().await.unwrap();
        assert_eq!(active, vec![r.clone()]);
        assert!(store.soon_reminders().await.unwrap().is_empty());
        assert_eq!(store.user_tags("1").await.unwrap(), vec![r.tag.clone()]);
        assert_eq!(store.get(&r.tag).await.unwrap(), Some(r));
    }

    #[tokio::test]
    async fn test_promote_moves_between_tiers() {
        let store = store();
        let r = reminder("1", 1000);
        store.insert_active(&r).await.unwrap();

        store.promote(&r.tag).await.unwrap();
        assert!(store.active_reminders().await.unwrap().is_empty());
        assert_eq!(store.soon_reminders().await.unwrap(), vec![r]);
    }

    #[tokio::test]
    async fn test_remove_clears_everything() {
        let store = store();
        let r = reminder("1", 1000);
        store.insert_soon(&r).await.unwrap();

        store.remove(&r).await.unwrap();
        assert!(store.get(&r.tag).await.unwrap().is_none());
        assert!(store.soon_reminders().await.unwrap().is_empty());
        assert!(store.user_tags("1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hydrate_drops_dangling_tags() {
        let store = store();
        let r = reminder("1", 1000);
        store.insert_active(&r).await.unwrap();
        // Delete the record out from under the set.
        store.kv.delete_record(&record_key(&r.tag)).await.unwrap();

        assert!(store.active_reminders().await.unwrap().is_empty());
        // The dangling tag was healed out of the set too.
        assert!(store.kv.members_of(ACTIVE_SET).await.unwrap().is_empty());
    }
}
