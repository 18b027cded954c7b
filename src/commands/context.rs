//! Shared context for command handlers
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use crate::features::reminders::ReminderService;

/// Shared context for all command handlers
///
/// Carries the services command handlers need; today that is just the
/// reminder service.
#[derive(Clone)]
pub struct CommandContext {
    pub reminders: ReminderService,
}

impl CommandContext {
    /// Create a new CommandContext with the given services
    pub fn new(reminders: ReminderService) -> Self {
        Self { reminders }
    }
}
