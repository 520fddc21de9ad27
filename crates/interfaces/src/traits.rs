use async_trait::async_trait;
use serde::Serialize;

/// One-way notifications from the assistant to whatever is presenting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum AssistantEvent {
    ListeningStarted,
    ListeningStopped,
    CommandProcessed {
        command: String,
        response: String,
        timestamp: String,
    },
}

impl AssistantEvent {
    pub fn command_processed(command: impl Into<String>, response: impl Into<String>) -> Self {
        Self::CommandProcessed {
            command: command.into(),
            response: response.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AssistantEvent::ListeningStarted => "listening-started",
            AssistantEvent::ListeningStopped => "listening-stopped",
            AssistantEvent::CommandProcessed { .. } => "command-processed",
        }
    }
}

#[async_trait]
pub trait Interface: Send + Sync {
    async fn receive_input(&self) -> Option<String>;
    async fn send_output(&self, message: &str);
    async fn request_approval(&self, action: &str) -> bool;
    async fn show_status(&self, status: &str);
    async fn emit(&self, event: AssistantEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_names() {
        let started = serde_json::to_value(AssistantEvent::ListeningStarted).unwrap();
        assert_eq!(started["event"], "listening-started");

        let processed = AssistantEvent::command_processed("open calculator", "calc");
        assert_eq!(processed.name(), "command-processed");

        let value = serde_json::to_value(&processed).unwrap();
        assert_eq!(value["event"], "command-processed");
        assert_eq!(value["command"], "open calculator");
        assert_eq!(value["response"], "calc");
        assert!(chrono::DateTime::parse_from_rfc3339(value["timestamp"].as_str().unwrap()).is_ok());
    }
}
