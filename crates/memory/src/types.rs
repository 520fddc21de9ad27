use serde::{Deserialize, Serialize};

pub const KEY_GEMINI_API_KEY: &str = "geminiApiKey";
pub const KEY_HOTKEY: &str = "hotkey";
pub const KEY_VOICE_ENABLED: &str = "voiceEnabled";

pub const DEFAULT_HOTKEY: &str = "CommandOrControl+Shift+G";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: i64,
    pub query: String,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_succeeded: Option<bool>,
}

impl HistoryEntry {
    pub fn new(query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp(),
            query: query.into(),
            response: response.into(),
            command: None,
            command_succeeded: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>, succeeded: Option<bool>) -> Self {
        self.command = Some(command.into());
        self.command_succeeded = succeeded;
        self
    }
}
