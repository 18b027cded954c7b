//! # Features Layer
//!
//! Feature modules. Each feature keeps its own types, scheduling logic, and
//! tests under one directory.

pub mod reminders;

pub use reminders::{
    ChatClient, DispatchError, Dispatcher, Reminder, ReminderScheduler, ReminderService,
    ReminderStore, SchedulerHandle, SerenityChatClient, DEFAULT_PROMOTION_WINDOW_SECS,
};
