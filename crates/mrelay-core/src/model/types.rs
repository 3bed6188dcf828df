use serde::{Deserialize, Serialize};

/// Chat roles sent to the completion provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One completion call: a system message followed by the user's query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_text: String,
}

impl CompletionRequest {
    pub fn new(
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        user_text: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            user_text: user_text.into(),
        }
    }

    /// Messages in the order the provider expects them.
    pub fn messages(&self) -> [(Role, &str); 2] {
        [
            (Role::System, self.system_prompt.as_str()),
            (Role::User, self.user_text.as_str()),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionReply {
    pub text: String,
}
