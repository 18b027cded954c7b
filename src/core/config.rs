//! Environment-driven configuration
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Promotion window override for fast local testing
//! - 1.0.0: Initial implementation

use anyhow::{bail, Context as _, Result};
use std::env;

use crate::features::reminders::DEFAULT_PROMOTION_WINDOW_SECS;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token (required).
    pub discord_token: String,
    /// Optional guild to register commands against; global registration
    /// otherwise. Guild registration propagates instantly, which is what
    /// you want while developing.
    pub guild_id: Option<u64>,
    /// Path of the sqlite database file backing the reminder store.
    pub database_path: String,
    /// Promotion pass lookahead, in seconds.
    pub promotion_window_secs: i64,
    /// Default log filter handed to env_logger.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let discord_token =
            env::var("DISCORD_TOKEN").context("DISCORD_TOKEN environment variable is not set")?;
        if discord_token.trim().is_empty() {
            bail!("DISCORD_TOKEN is empty");
        }

        let guild_id = match env::var("GUILD_ID") {
            Ok(raw) => Some(raw.parse().context("GUILD_ID is not a valid guild id")?),
            Err(_) => None,
        };

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "chime.db".to_string());

        let promotion_window_secs = match env::var("PROMOTION_WINDOW_SECS") {
            Ok(raw) => raw
                .parse()
                .context("PROMOTION_WINDOW_SECS is not a number")?,
            Err(_) => DEFAULT_PROMOTION_WINDOW_SECS,
        };
        if promotion_window_secs <= 0 {
            bail!("PROMOTION_WINDOW_SECS must be positive");
        }

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            discord_token,
            guild_id,
            database_path,
            promotion_window_secs,
            log_level,
        })
    }
}
