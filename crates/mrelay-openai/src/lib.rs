//! OpenAI-compatible chat completion adapter.
//!
//! Posts `{model, messages}` to a configured endpoint with bearer auth and
//! reads `choices[0].message.content`. Works with any provider that speaks the
//! `chat/completions` shape.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mrelay_core::{
    config::Config,
    errors::Error,
    model::{
        client::CompletionClient,
        types::{CompletionReply, CompletionRequest, Role},
    },
    Result,
};

const ERROR_BODY_SNIPPET: usize = 200;

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: Role,
    content: &'a str,
}

impl<'a> From<&'a CompletionRequest> for ChatCompletionBody<'a> {
    fn from(req: &'a CompletionRequest) -> Self {
        Self {
            model: &req.model,
            messages: req
                .messages()
                .into_iter()
                .map(|(role, content)| ChatMessage { role, content })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone, Debug)]
pub struct OpenAiClient {
    endpoint: String,
    api_key: String,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("openai http client: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            cfg.openai_base_url.clone(),
            cfg.openai_api_key.clone(),
            cfg.completion_timeout,
        )
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, req: &CompletionRequest) -> Result<CompletionReply> {
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ChatCompletionBody::from(req))
            .send()
            .await
            .map_err(|e| Error::Completion(format!("request error: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Completion(format!("reading response body: {e}")))?;

        if !status.is_success() {
            return Err(Error::Completion(format!(
                "provider returned {status}: {}",
                body.chars().take(ERROR_BODY_SNIPPET).collect::<String>()
            )));
        }

        let text = parse_completion(&body)?;
        debug!(model = %req.model, chars = text.chars().count(), "completion received");
        Ok(CompletionReply { text })
    }
}

fn parse_completion(body: &str) -> Result<String> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| Error::Completion(format!("unexpected response shape: {e}")))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::Completion("response contained no choices".to_string()))?;

    let content = choice
        .message
        .content
        .ok_or_else(|| Error::Completion("first choice has no message content".to_string()))?;

    // Telegram refuses empty messages, so an empty answer is as good as none.
    if content.trim().is_empty() {
        return Err(Error::Completion("model returned empty text".to_string()));
    }

    Ok(content)
}
