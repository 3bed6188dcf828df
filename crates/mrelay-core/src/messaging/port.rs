use std::time::Duration;

use async_trait::async_trait;

use crate::{
    domain::{BotIdentity, ChatId, InboundUpdate, MessageId, MessageRef},
    Result,
};

/// Messenger port.
///
/// Each method maps its failures to a dedicated error variant:
/// `get_me` to `IdentityFetch`, `get_updates` to `Fetch`, `send_reply` to
/// `Delivery`.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn get_me(&self) -> Result<BotIdentity>;

    /// Long-poll for updates with `update_id >= offset`, holding the request
    /// open for at most `timeout` when nothing is pending.
    async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<InboundUpdate>>;

    async fn send_reply(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to: MessageId,
    ) -> Result<MessageRef>;
}
