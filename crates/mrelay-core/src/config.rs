use std::{env, time::Duration};

use tracing::warn;

use crate::{errors::Error, Result};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Hard Telegram limit for a single text message, in UTF-16 code units.
pub const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;

/// Longest long-poll hold the Bot API honours.
pub const MAX_POLL_TIMEOUT_SECS: u64 = 50;

const REQUIRED_VARS: [&str; 4] = [
    "TELEGRAM_BOT_TOKEN",
    "OPENAI_BASE_URL",
    "OPENAI_API_KEY",
    "OPENAI_MODEL",
];

/// Typed configuration for the relay.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub telegram_api_base: String,
    pub telegram_request_timeout: Duration,
    pub telegram_message_limit: usize,

    // Completion provider
    pub openai_base_url: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub system_prompt: String,
    pub completion_timeout: Duration,

    // Polling
    pub poll_timeout: Duration,
    pub poll_idle: Duration,
}

impl Config {
    /// Load from the process environment, after merging a `.env` file from the
    /// working directory if one exists. Existing variables are never overridden.
    pub fn load() -> Result<Self> {
        note_env_file(dotenvy::dotenv());
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Fails before any network call when a
    /// required value is absent or blank.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|&key| get(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let required = |key: &str| get(key).unwrap_or_default();
        let secs = |key: &str, default: u64| {
            Duration::from_secs(get(key).and_then(|s| parse_u64(&s)).unwrap_or(default))
        };

        let telegram_message_limit = get("TELEGRAM_MESSAGE_LIMIT")
            .and_then(|s| parse_u64(&s))
            .map(|n| usize::try_from(n).unwrap_or(TELEGRAM_MAX_MESSAGE_LEN))
            .unwrap_or(4000)
            .clamp(1, TELEGRAM_MAX_MESSAGE_LEN);

        Ok(Self {
            telegram_bot_token: required("TELEGRAM_BOT_TOKEN"),
            telegram_api_base: get("TELEGRAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            telegram_request_timeout: secs("TELEGRAM_REQUEST_TIMEOUT_SECS", 15),
            telegram_message_limit,
            openai_base_url: required("OPENAI_BASE_URL"),
            openai_api_key: required("OPENAI_API_KEY"),
            openai_model: required("OPENAI_MODEL"),
            system_prompt: get("SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            completion_timeout: secs("COMPLETION_TIMEOUT_SECS", 60),
            poll_timeout: secs("POLL_TIMEOUT_SECS", 30)
                .min(Duration::from_secs(MAX_POLL_TIMEOUT_SECS)),
            poll_idle: Duration::from_millis(
                get("POLL_IDLE_MS")
                    .and_then(|s| parse_u64(&s))
                    .unwrap_or(1000),
            ),
        })
    }
}

/// A missing `.env` is normal; one that fails to parse is reported and
/// skipped. Returns false in the latter case.
fn note_env_file<T>(res: std::result::Result<T, dotenvy::Error>) -> bool {
    match res {
        Err(e) if !e.not_found() => {
            warn!(error = %e, "ignoring unreadable .env file");
            false
        }
        _ => true,
    }
}

fn parse_u64(s: &str) -> Option<u64> {
    s.trim().parse::<u64>().ok()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
