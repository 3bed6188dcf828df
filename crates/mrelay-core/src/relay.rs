//! Poll-and-respond loop.
//!
//! One sequential task: fetch updates after the cursor, answer the ones that
//! mention the bot, pause, repeat. Per-update failures (provider errors,
//! delivery errors) are logged and never end the loop; fetch failures are
//! retried on the next iteration.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    domain::{BotIdentity, Cursor, InboundMessage, InboundUpdate},
    errors::Error,
    formatting::{split_message, truncate_with_ellipsis},
    mention::strip_mention,
    messaging::port::MessagingPort,
    model::{client::CompletionClient, types::CompletionRequest},
    Result,
};

/// Reply sent when the bot is mentioned with nothing after the handle.
pub const EMPTY_QUERY_REPLY: &str = "I don't see text";

/// Reply sent when the completion provider fails.
pub const COMPLETION_FAILED_REPLY: &str = "Sorry, I encountered an error processing your request.";

#[derive(Clone, Debug)]
pub struct RelaySettings {
    pub model: String,
    pub system_prompt: String,
    pub poll_timeout: Duration,
    pub poll_idle: Duration,
    pub message_limit: usize,
}

impl From<&Config> for RelaySettings {
    fn from(cfg: &Config) -> Self {
        Self {
            model: cfg.openai_model.clone(),
            system_prompt: cfg.system_prompt.clone(),
            poll_timeout: cfg.poll_timeout,
            poll_idle: cfg.poll_idle,
            message_limit: cfg.telegram_message_limit,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NoMessage,
    NoText,
    NotMentioned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyKind {
    EmptyQuery,
    Answer,
    Apology,
}

/// What happened to a single update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    Skipped(SkipReason),
    Replied { kind: ReplyKind, delivered: bool },
}

pub struct Relay {
    settings: RelaySettings,
    identity: BotIdentity,
    messenger: Arc<dyn MessagingPort>,
    model: Arc<dyn CompletionClient>,
    cursor: Cursor,
}

impl Relay {
    /// Fetch the bot identity and build a relay with a fresh cursor.
    pub async fn bootstrap(
        settings: RelaySettings,
        messenger: Arc<dyn MessagingPort>,
        model: Arc<dyn CompletionClient>,
    ) -> Result<Self> {
        let identity = messenger.get_me().await.map_err(|e| match e {
            Error::IdentityFetch(_) => e,
            other => Error::IdentityFetch(other.to_string()),
        })?;
        if identity.handle.trim().is_empty() {
            return Err(Error::IdentityFetch(
                "bot identity has an empty username".to_string(),
            ));
        }

        info!(handle = %identity.handle, model = %settings.model, "relay bootstrapped");

        Ok(Self {
            settings,
            identity,
            messenger,
            model,
            cursor: Cursor::default(),
        })
    }

    pub fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Run until `cancel` fires.
    ///
    /// Cancellation interrupts a pending fetch or the idle pause. A batch that
    /// has been fetched is always processed to the end.
    pub async fn run(&mut self, cancel: CancellationToken) {
        info!(handle = %self.identity.handle, "polling for mentions");

        loop {
            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                res = self.fetch() => res,
            };

            match fetched {
                Ok(updates) => {
                    self.process_batch(updates).await;
                }
                Err(e) => {
                    warn!(error = %e, offset = self.cursor.next_offset(), "poll failed; retrying");
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = sleep(self.settings.poll_idle) => {}
            }
        }

        info!(last_seen = self.cursor.last_seen_id(), "relay stopped");
    }

    /// One fetch plus processing of the returned batch, without the idle pause.
    pub async fn poll_once(&mut self) -> Result<Vec<UpdateOutcome>> {
        let updates = self.fetch().await?;
        Ok(self.process_batch(updates).await)
    }

    async fn fetch(&self) -> Result<Vec<InboundUpdate>> {
        let offset = self.cursor.next_offset();
        self.messenger
            .get_updates(offset, self.settings.poll_timeout)
            .await
            .map_err(|e| match e {
                Error::Fetch(_) => e,
                other => Error::Fetch(other.to_string()),
            })
    }

    pub async fn process_batch(&mut self, updates: Vec<InboundUpdate>) -> Vec<UpdateOutcome> {
        if !updates.is_empty() {
            debug!(count = updates.len(), "received updates");
        }

        let mut outcomes = Vec::with_capacity(updates.len());
        for update in updates {
            outcomes.push(self.handle_update(update).await);
        }
        outcomes
    }

    pub async fn handle_update(&mut self, update: InboundUpdate) -> UpdateOutcome {
        // Advance first so a skipped or failing update is never requested again.
        self.cursor.observe(update.update_id);

        let Some(msg) = update.message else {
            return UpdateOutcome::Skipped(SkipReason::NoMessage);
        };
        let Some(text) = msg.text.as_deref() else {
            return UpdateOutcome::Skipped(SkipReason::NoText);
        };
        let Some(query) = strip_mention(text, &self.identity.handle) else {
            return UpdateOutcome::Skipped(SkipReason::NotMentioned);
        };

        info!(
            update_id = update.update_id,
            chat_id = msg.chat_id.0,
            message_id = msg.message_id.0,
            from = msg.from_username.as_deref().unwrap_or("unknown"),
            "mentioned"
        );

        if query.is_empty() {
            let delivered = self.reply(&msg, EMPTY_QUERY_REPLY).await;
            return UpdateOutcome::Replied {
                kind: ReplyKind::EmptyQuery,
                delivered,
            };
        }

        debug!(query = %truncate_with_ellipsis(query, 80), "querying model");
        let req = CompletionRequest::new(
            self.settings.model.as_str(),
            self.settings.system_prompt.as_str(),
            query,
        );

        match self.model.complete(&req).await {
            Ok(reply) => {
                let delivered = self.reply(&msg, &reply.text).await;
                UpdateOutcome::Replied {
                    kind: ReplyKind::Answer,
                    delivered,
                }
            }
            Err(e) => {
                warn!(error = %e, chat_id = msg.chat_id.0, "completion failed");
                let delivered = self.reply(&msg, COMPLETION_FAILED_REPLY).await;
                UpdateOutcome::Replied {
                    kind: ReplyKind::Apology,
                    delivered,
                }
            }
        }
    }

    /// Send `text` as one or more replies to `origin`. Returns false as soon as
    /// a chunk fails; later chunks are not sent.
    async fn reply(&self, origin: &InboundMessage, text: &str) -> bool {
        for chunk in split_message(text, self.settings.message_limit) {
            if let Err(e) = self
                .messenger
                .send_reply(origin.chat_id, &chunk, origin.message_id)
                .await
            {
                warn!(
                    error = %e,
                    chat_id = origin.chat_id.0,
                    reply_to = origin.message_id.0,
                    "reply delivery failed"
                );
                return false;
            }
        }
        true
    }
}
