use async_trait::async_trait;

use crate::Result;

use super::types::{CompletionReply, CompletionRequest};

/// Completion backend used by the relay.
///
/// Implementations make exactly one attempt per call and report every failure
/// as `Error::Completion`; retrying is the caller's decision.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, req: &CompletionRequest) -> Result<CompletionReply>;
}
