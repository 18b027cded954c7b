//! Tick-driven reminder scheduling
//!
//! Two cooperating passes over two tiers. The promotion pass runs once per
//! window and pulls everything firing within the next window out of the
//! durable active set into a small in-memory queue. The dispatch pass runs
//! every second, fires due entries, and gives transiently-failed ones a
//! single retry through the unsent queue before abandoning them.
//!
//! The scheduler is the only writer of both in-memory queues. Other
//! components reach them through [`SchedulerHandle`] messages, which are
//! applied at the top of each tick.
//!
//! - **Version**: 2.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.1.0: Restore the durable soon set at startup
//! - 2.0.0: Message channel for deletes; a cancelled reminder no longer fires
//! - 1.0.0: Initial promotion/dispatch loop

use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};

use super::cache::{CacheEntry, TimeOrderedCache};
use super::dispatcher::{ChatClient, DispatchError, Dispatcher};
use super::reminder::Reminder;
use super::store::ReminderStore;

/// Default lookahead horizon of the promotion pass, in seconds.
pub const DEFAULT_PROMOTION_WINDOW_SECS: i64 = 120;

/// Requests other components hand the scheduler. Applied at the top of each
/// tick, before the promotion and dispatch passes.
#[derive(Debug)]
pub enum SchedulerMsg {
    /// Drop one reminder from the in-memory queues (after a user delete).
    Forget { tag: String },
    /// Drop every reminder of one user (after a clear).
    ForgetAll { owner_id: String },
    /// Queue a reminder that was persisted straight into the soon tier.
    Promote(Reminder),
}

/// Cheap cloneable sender for [`SchedulerMsg`]; held by the service layer.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::UnboundedSender<SchedulerMsg>,
}

impl SchedulerHandle {
    pub fn forget(&self, tag: &str) {
        // Send fails only when the scheduler is gone; nothing to purge then.
        let _ = self.tx.send(SchedulerMsg::Forget {
            tag: tag.to_string(),
        });
    }

    pub fn forget_all(&self, owner_id: &str) {
        let _ = self.tx.send(SchedulerMsg::ForgetAll {
            owner_id: owner_id.to_string(),
        });
    }

    pub fn promote(&self, reminder: Reminder) {
        let _ = self.tx.send(SchedulerMsg::Promote(reminder));
    }
}

/// Owns the `soon` and `unsent` queues and drives both scheduler passes.
pub struct ReminderScheduler {
    store: ReminderStore,
    soon: TimeOrderedCache,
    unsent: TimeOrderedCache,
    window_secs: i64,
    rx: mpsc::UnboundedReceiver<SchedulerMsg>,
}

impl ReminderScheduler {
    pub fn new(store: ReminderStore, window_secs: i64) -> (ReminderScheduler, SchedulerHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            ReminderScheduler {
                store,
                soon: TimeOrderedCache::new(),
                unsent: TimeOrderedCache::new(),
                window_secs: window_secs.max(1),
                rx,
            },
            SchedulerHandle { tx },
        )
    }

    /// Run forever on a one-second tick. Tick zero runs a promotion pass,
    /// so pending work is picked up right after startup.
    pub async fn run(mut self, chat: Arc<dyn ChatClient>) {
        let dispatcher = Dispatcher::new(chat);
        self.restore().await;

        info!(
            "Reminder scheduler running (promotion window {}s)",
            self.window_secs
        );
        let mut ticker = interval(Duration::from_secs(1));
        let mut tick: u64 = 0;
        loop {
            ticker.tick().await;
            let now = chrono::Utc::now().timestamp();
            self.handle_tick(&dispatcher, tick, now).await;
            tick = tick.wrapping_add(1);
        }
    }

    /// Reload the durable soon tier after a restart. Anything promoted but
    /// not yet fired when the process died comes back through here, and
    /// overdue entries fire on the first dispatch pass.
    pub async fn restore(&mut self) {
        match self.store.soon_reminders().await {
            Ok(reminders) => {
                if !reminders.is_empty() {
                    info!("Restored {} promoted reminder(s) from storage", reminders.len());
                }
                for reminder in reminders {
                    self.soon.add(CacheEntry::new(reminder));
                }
            }
            Err(e) => error!("Failed to restore promoted reminders: {e:#}"),
        }
    }

    /// One tick: apply queued requests, run the promotion pass on window
    /// boundaries, then the dispatch pass.
    pub async fn handle_tick(&mut self, dispatcher: &Dispatcher, tick: u64, now: i64) {
        self.apply_messages();
        if tick % self.window_secs as u64 == 0 {
            self.promotion_pass(now).await;
        }
        self.dispatch_pass(dispatcher, now).await;
    }

    fn apply_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                SchedulerMsg::Forget { tag } => {
                    self.soon.retain(|e| e.reminder.tag != tag);
                    self.unsent.retain(|e| e.reminder.tag != tag);
                }
                SchedulerMsg::ForgetAll { owner_id } => {
                    self.soon.retain(|e| e.reminder.owner_id != owner_id);
                    self.unsent.retain(|e| e.reminder.owner_id != owner_id);
                }
                SchedulerMsg::Promote(reminder) => {
                    debug!("Reminder {} queued straight into the soon tier", reminder.tag);
                    self.soon.add(CacheEntry::new(reminder));
                }
            }
        }
    }

    /// Coarse pass. First recover anything a missed tick left overdue in
    /// the soon queue; entries that are merely not due yet stay put (a
    /// reminder created mid-window lands here before its time). Then pull
    /// the next window's reminders out of the durable active tier.
    async fn promotion_pass(&mut self, now: i64) {
        while self.soon.peek().is_some_and(|e| e.fire_at < now) {
            let Some(entry) = self.soon.pop() else { break };
            warn!(
                "Reminder {} missed its tick (due {}s ago); moving to the retry queue",
                entry.reminder.tag,
                now - entry.fire_at
            );
            self.unsent.add(entry);
        }

        let active = match self.store.active_reminders().await {
            Ok(list) => list,
            Err(e) => {
                error!("Promotion pass could not read the active tier: {e:#}");
                return;
            }
        };

        for reminder in active {
            if reminder.fire_at - now < self.window_secs {
                if let Err(e) = self.store.promote(&reminder.tag).await {
                    error!("Failed to promote reminder {}: {e:#}", reminder.tag);
                    continue;
                }
                debug!(
                    "Promoted reminder {} (fires in {}s)",
                    reminder.tag,
                    reminder.fire_at - now
                );
                self.soon.add(CacheEntry::new(reminder));
            }
        }
    }

    /// Fine pass. Fire everything due, then give the whole unsent queue its
    /// single best-effort retry; retried reminders leave storage no matter
    /// how the attempt went.
    async fn dispatch_pass(&mut self, dispatcher: &Dispatcher, now: i64) {
        while self.soon.peek().is_some_and(|e| e.fire_at <= now) {
            let Some(entry) = self.soon.pop() else { break };
            match dispatcher.deliver(&entry.reminder).await {
                Ok(()) => {
                    info!(
                        "Delivered reminder {} to channel {}",
                        entry.reminder.tag, entry.reminder.channel_id
                    );
                    self.remove_from_store(&entry.reminder).await;
                }
                Err(DispatchError::PermissionDenied { .. }) => {
                    warn!(
                        "Dropping reminder {}: no permission to post in channel {}",
                        entry.reminder.tag, entry.reminder.channel_id
                    );
                    self.remove_from_store(&entry.reminder).await;
                }
                Err(DispatchError::Transient(e)) => {
                    warn!(
                        "Delivery of reminder {} failed, queuing one retry: {e:#}",
                        entry.reminder.tag
                    );
                    self.unsent.add(entry);
                }
            }
        }

        let retries: Vec<CacheEntry> = self.unsent.drain().collect();
        for entry in retries {
            match dispatcher.deliver(&entry.reminder).await {
                Ok(()) => info!("Delivered reminder {} on retry", entry.reminder.tag),
                Err(e) => error!(
                    "Reminder {} lost after failed retry: {e:#}",
                    entry.reminder.tag
                ),
            }
            self.remove_from_store(&entry.reminder).await;
        }
    }

    async fn remove_from_store(&self, reminder: &Reminder) {
        if let Err(e) = self.store.remove(reminder).await {
            error!(
                "Failed to remove reminder {} from storage: {e:#}",
                reminder.tag
            );
        }
    }
}
