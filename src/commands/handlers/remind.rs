//! Reminder command handlers
//!
//! Handles: remind, reminders, forget
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::get_string_option;
use crate::core::response::truncate_for_message;
use crate::features::reminders::{format_span, CreateError, DeleteOutcome};

/// Handler for reminder-related commands
pub struct RemindHandler;

#[async_trait]
impl SlashCommandHandler for RemindHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["remind", "reminders", "forget"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match command.data.name.as_str() {
            "remind" => self.handle_remind(&ctx, serenity_ctx, command).await,
            "reminders" => self.handle_reminders(&ctx, serenity_ctx, command).await,
            "forget" => self.handle_forget(&ctx, serenity_ctx, command).await,
            _ => Ok(()),
        }
    }
}

impl RemindHandler {
    /// Handle /remind command - create a new reminder
    async fn handle_remind(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let user_id = command.user.id.to_string();
        let channel_id = command.channel_id.to_string();

        let input = get_string_option(&command.data.options, "reminder")
            .ok_or_else(|| anyhow::anyhow!("Missing reminder parameter"))?;

        debug!("Processing remind command for user {user_id}: {input}");

        let reminder = match ctx.reminders.create(&user_id, &channel_id, &input).await {
            Ok(reminder) => reminder,
            Err(CreateError::Duration(e)) => {
                return respond(serenity_ctx, command, &format!("❌ {e}.")).await;
            }
            Err(CreateError::Store(e)) => return Err(e),
        };

        let span = format_span(reminder.fire_at - reminder.created_at);
        let content = if reminder.body.is_empty() {
            format!(
                "⏰ Got it! I'll remind you in **{span}**.\n\n*Reminder tag: `{}`*",
                reminder.tag
            )
        } else {
            format!(
                "⏰ Got it! I'll remind you in **{span}** about:\n> {}\n\n*Reminder tag: `{}`*",
                reminder.body, reminder.tag
            )
        };
        respond(serenity_ctx, command, &content).await
    }

    /// Handle /reminders command - list or clear reminders
    async fn handle_reminders(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let user_id = command.user.id.to_string();
        let action =
            get_string_option(&command.data.options, "action").unwrap_or_else(|| "list".to_string());

        match action.as_str() {
            "clear" => {
                let cleared = ctx.reminders.clear(&user_id).await?;
                let content = if cleared == 0 {
                    "📋 You didn't have any pending reminders.".to_string()
                } else {
                    format!(
                        "🧹 Cleared **{cleared}** reminder{}.",
                        if cleared == 1 { "" } else { "s" }
                    )
                };
                respond(serenity_ctx, command, &content).await
            }
            _ => self.handle_list(ctx, serenity_ctx, command, &user_id).await,
        }
    }

    /// List all pending reminders
    async fn handle_list(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        user_id: &str,
    ) -> Result<()> {
        let reminders = ctx.reminders.list(user_id).await?;

        if reminders.is_empty() {
            return respond(
                serenity_ctx,
                command,
                "📋 You don't have any pending reminders.\n\nUse `/remind` to create one!",
            )
            .await;
        }

        let now = chrono::Utc::now().timestamp();
        let mut listing = String::from("📋 **Your Pending Reminders:**\n\n");
        for reminder in &reminders {
            let remaining = reminder.fire_at - now;
            let when = if remaining > 0 {
                format!("in {}", format_span(remaining))
            } else {
                "any moment now".to_string()
            };
            listing.push_str(&format!("**`{}`** - {when}\n", reminder.tag));
            if !reminder.body.is_empty() {
                listing.push_str(&format!("> {}\n", reminder.body));
            }
            listing.push('\n');
        }
        listing.push_str("*Use `/forget <tag>` to cancel a reminder.*");

        respond(serenity_ctx, command, &truncate_for_message(&listing)).await
    }

    /// Handle /forget command - cancel one reminder by tag
    async fn handle_forget(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let user_id = command.user.id.to_string();
        let tag = get_string_option(&command.data.options, "tag")
            .ok_or_else(|| anyhow::anyhow!("Missing tag parameter"))?;
        let tag = tag.trim().to_lowercase();

        let content = match ctx.reminders.delete(&user_id, &tag).await? {
            DeleteOutcome::Deleted => format!("✅ Cancelled reminder `{tag}`."),
            DeleteOutcome::NotFound => format!(
                "❌ Reminder `{tag}` not found or doesn't belong to you. Use `/reminders` to see your tags."
            ),
        };
        respond(serenity_ctx, command, &content).await
    }
}

/// Send a plain channel-message interaction response
async fn respond(
    serenity_ctx: &Context,
    command: &ApplicationCommandInteraction,
    content: &str,
) -> Result<()> {
    command
        .create_interaction_response(&serenity_ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|msg| msg.content(content))
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remind_handler_commands() {
        let handler = RemindHandler;
        let names = handler.command_names();

        assert!(names.contains(&"remind"));
        assert!(names.contains(&"reminders"));
        assert!(names.contains(&"forget"));
        assert_eq!(names.len(), 3);
    }
}
