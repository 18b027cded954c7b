//! Chime bot entrypoint
//!
//! Wires the store, scheduler, and command surface together and runs the
//! Discord gateway connection.

use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};
use serenity::async_trait;
use serenity::model::application::interaction::Interaction;
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;

use chime::commands::handlers::create_all_handlers;
use chime::commands::{register_global_commands, register_guild_commands};
use chime::commands::{CommandContext, CommandRegistry};
use chime::core::Config;
use chime::features::reminders::{
    ReminderScheduler, ReminderService, ReminderStore, SerenityChatClient,
};
use chime::store::SqliteStore;

struct Handler {
    registry: CommandRegistry,
    ctx: Arc<CommandContext>,
    guild_id: Option<GuildId>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected and ready", ready.user.name);

        let result = match self.guild_id {
            Some(guild_id) => register_guild_commands(&ctx, guild_id).await,
            None => register_global_commands(&ctx).await,
        };
        if let Err(e) = result {
            error!("Failed to register slash commands: {e:#}");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::ApplicationCommand(command) = interaction {
            let name = command.data.name.clone();
            let Some(handler) = self.registry.get(&name) else {
                return;
            };
            if let Err(e) = handler.handle(Arc::clone(&self.ctx), &ctx, &command).await {
                error!("Command /{name} failed: {e:#}");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Chime reminder bot...");

    let kv = SqliteStore::open(&config.database_path)?;
    let store = ReminderStore::new(Arc::new(kv));

    let (scheduler, scheduler_handle) =
        ReminderScheduler::new(store.clone(), config.promotion_window_secs);
    let service = ReminderService::new(store, scheduler_handle, config.promotion_window_secs);

    let mut registry = CommandRegistry::new();
    for handler in create_all_handlers() {
        registry.register(handler);
    }

    let handler = Handler {
        registry,
        ctx: Arc::new(CommandContext::new(service)),
        guild_id: config.guild_id.map(GuildId),
    };

    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::DIRECT_MESSAGES;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");

    // Start the reminder scheduler against the gateway's HTTP client
    let http = client.cache_and_http.http.clone();
    tokio::spawn(async move {
        scheduler
            .run(Arc::new(SerenityChatClient::new(http)))
            .await;
    });

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
