use genx_executor::CommandResult;
use serde::{Deserialize, Serialize};

/// Model reply. `command` is set only when the reply classified as an
/// executable command, and then equals `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiResponse {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl AiResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            command: None,
        }
    }

    pub fn is_command(&self) -> bool {
        self.command.is_some()
    }
}

/// Everything one request produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOutcome {
    pub response: AiResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<CommandResult>,
}
