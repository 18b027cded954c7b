//! # Reminders Feature
//!
//! Tiered reminder scheduling. A reminder waits in durable storage until a
//! coarse promotion pass pulls it into a small in-memory queue, then a
//! per-second dispatch pass delivers it, with one retry for transient
//! delivery failures.
//!
//! - **Version**: 2.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 2.1.0: Restart recovery from the durable soon tier
//! - 2.0.0: Deletes purge the scheduler queues
//! - 1.0.0: Initial release

pub mod cache;
pub mod dispatcher;
pub mod duration;
pub mod reminder;
pub mod scheduler;
pub mod service;
pub mod store;

pub use cache::{CacheEntry, TimeOrderedCache};
pub use dispatcher::{ChatClient, DispatchError, Dispatcher, SerenityChatClient};
pub use duration::{format_span, DurationError, DurationSpec, MAX_DURATION_DAYS};
pub use reminder::Reminder;
pub use scheduler::{
    ReminderScheduler, SchedulerHandle, SchedulerMsg, DEFAULT_PROMOTION_WINDOW_SECS,
};
pub use service::{CreateError, DeleteOutcome, ReminderService};
pub use store::ReminderStore;
