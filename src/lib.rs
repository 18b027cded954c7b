// Core layer - configuration and shared Discord utilities
pub mod core;

// Features layer - reminder scheduling
pub mod features;

// Infrastructure - durable key-value persistence
pub mod store;

// Application layer
pub mod commands;

// Re-export core config
pub use crate::core::Config;

// Re-export feature items
pub use features::{
    ChatClient, Dispatcher, Reminder, ReminderScheduler, ReminderService, ReminderStore,
    SchedulerHandle, SerenityChatClient,
};

// Re-export store backends
pub use store::{KvStore, MemoryStore, SqliteStore};
