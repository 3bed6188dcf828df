//! Telegram adapter.
//!
//! Implements the `mrelay-core` MessagingPort over the Bot HTTP API with
//! `reqwest` and typed `serde` records. Long polling only; no webhooks.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

mod types;

use mrelay_core::{
    config::Config,
    domain::{BotIdentity, ChatId, InboundUpdate, MessageId, MessageRef},
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

use crate::types::{decode_updates, ApiResponse, SendMessageBody, SentMessage, User};

/// Extra time granted to `getUpdates` beyond the server-side long-poll hold.
const LONG_POLL_MARGIN: Duration = Duration::from_secs(10);

const ERROR_BODY_SNIPPET: usize = 200;

fn long_poll_request_timeout(hold: Duration) -> Duration {
    hold.saturating_add(LONG_POLL_MARGIN)
}

#[derive(Clone, Debug)]
pub struct TelegramMessenger {
    api_base: String,
    token: String,
    request_timeout: Duration,
    http: reqwest::Client,
}

impl TelegramMessenger {
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        // No client-wide timeout: `getUpdates` needs a longer one than the rest.
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::External(format!("telegram http client: {e}")))?;
        Ok(Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
            request_timeout,
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            cfg.telegram_api_base.clone(),
            cfg.telegram_bot_token.clone(),
            cfg.telegram_request_timeout,
        )
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// The token is part of every URL and reqwest errors echo the URL.
    fn redact(&self, s: &str) -> String {
        if self.token.is_empty() {
            return s.to_string();
        }
        s.replace(&self.token, "<redacted>")
    }

    /// Send a Bot API request and unwrap the `{ok, result}` envelope.
    ///
    /// `kind` picks the error variant for the operation being performed.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        req: reqwest::RequestBuilder,
        kind: fn(String) -> Error,
    ) -> Result<T> {
        let resp = req
            .send()
            .await
            .map_err(|e| kind(format!("{method}: {}", self.redact(&e.to_string()))))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            kind(format!(
                "{method}: reading body: {}",
                self.redact(&e.to_string())
            ))
        })?;

        if !status.is_success() {
            return Err(kind(format!(
                "{method}: {status} {}",
                body.chars().take(ERROR_BODY_SNIPPET).collect::<String>()
            )));
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&body)
            .map_err(|e| kind(format!("{method}: decode error: {e}")))?;

        if !envelope.ok {
            return Err(kind(format!(
                "{method}: {}",
                envelope
                    .description
                    .unwrap_or_else(|| "request was not ok".to_string())
            )));
        }

        envelope
            .result
            .ok_or_else(|| kind(format!("{method}: response has no result")))
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn get_me(&self) -> Result<BotIdentity> {
        let req = self
            .http
            .get(self.method_url("getMe"))
            .timeout(self.request_timeout);
        let me: User = self.call("getMe", req, Error::IdentityFetch).await?;

        match me.username {
            Some(handle) if !handle.trim().is_empty() => Ok(BotIdentity { handle }),
            _ => Err(Error::IdentityFetch(
                "getMe: bot account has no username".to_string(),
            )),
        }
    }

    async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<InboundUpdate>> {
        let req = self
            .http
            .get(self.method_url("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout.as_secs().to_string()),
            ])
            .timeout(long_poll_request_timeout(timeout));

        let raw: Vec<serde_json::Value> = self.call("getUpdates", req, Error::Fetch).await?;

        let updates = decode_updates(raw);
        if !updates.is_empty() {
            debug!(offset, count = updates.len(), "fetched updates");
        }
        Ok(updates)
    }

    async fn send_reply(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to: MessageId,
    ) -> Result<MessageRef> {
        let body = SendMessageBody {
            chat_id: chat_id.0,
            text,
            reply_to_message_id: reply_to.0,
        };
        let req = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&body)
            .timeout(self.request_timeout);

        let sent: SentMessage = self.call("sendMessage", req, Error::Delivery).await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(sent.message_id),
        })
    }
}
