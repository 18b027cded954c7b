//! Reminder delivery
//!
//! Formats a due reminder as an owner mention plus the stored body and
//! sends it through the chat client boundary. Failures are bucketed into
//! permission-denied (terminal) and everything else (worth one retry).
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use anyhow::anyhow;
use async_trait::async_trait;
use log::debug;
use serenity::http::{Http, HttpError};
use serenity::model::id::ChannelId;
use std::sync::Arc;
use thiserror::Error;

use crate::core::response::truncate_for_message;

use super::reminder::Reminder;

/// How a delivery attempt failed.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The bot can no longer post in the target channel. Retrying cannot
    /// succeed until a human fixes permissions, so the reminder is dropped.
    #[error("no permission to post in channel {channel_id}")]
    PermissionDenied { channel_id: String },
    /// Anything else: network trouble, rate limiting, a channel that may
    /// come back. Worth exactly one retry.
    #[error("delivery failed: {0}")]
    Transient(#[from] anyhow::Error),
}

/// Boundary to the chat platform: deliver one message to one channel.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<(), DispatchError>;
}

/// Serenity-backed chat client used by the running bot.
pub struct SerenityChatClient {
    http: Arc<Http>,
}

impl SerenityChatClient {
    pub fn new(http: Arc<Http>) -> SerenityChatClient {
        SerenityChatClient { http }
    }
}

#[async_trait]
impl ChatClient for SerenityChatClient {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<(), DispatchError> {
        let id: u64 = channel_id.parse().map_err(|_| {
            DispatchError::Transient(anyhow!("channel id `{channel_id}` is not a snowflake"))
        })?;

        match ChannelId(id).say(&self.http, text).await {
            Ok(_) => Ok(()),
            Err(serenity::Error::Http(err)) if is_permission_error(&err) => {
                Err(DispatchError::PermissionDenied {
                    channel_id: channel_id.to_string(),
                })
            }
            Err(err) => Err(DispatchError::Transient(anyhow::Error::new(err))),
        }
    }
}

fn is_permission_error(err: &HttpError) -> bool {
    matches!(err, HttpError::UnsuccessfulRequest(resp) if resp.status_code.as_u16() == 403)
}

/// Formats and delivers due reminders through a `ChatClient`.
pub struct Dispatcher {
    client: Arc<dyn ChatClient>,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn ChatClient>) -> Dispatcher {
        Dispatcher { client }
    }

    /// Send `reminder` to its channel, mentioning the owner.
    pub async fn deliver(&self, reminder: &Reminder) -> Result<(), DispatchError> {
        let text = if reminder.body.is_empty() {
            format!("<@{}> ⏰ This is your reminder!", reminder.owner_id)
        } else {
            format!("<@{}> ⏰ Reminder: {}", reminder.owner_id, reminder.body)
        };

        debug!(
            "Dispatching reminder {} to channel {}",
            reminder.tag, reminder.channel_id
        );
        self.client
            .send_message(&reminder.channel_id, &truncate_for_message(&text))
            .await
    }
}
