use crate::traits::{AssistantEvent, Interface};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, Mutex};

/// Line-oriented stdin/stdout front end.
///
/// Input lines arrive through a channel so that waiting for input can be
/// raced against other events without losing a partially read line.
pub struct TerminalInterface {
    lines: Mutex<mpsc::Receiver<String>>,
}

impl TerminalInterface {
    /// Spawns the stdin reader task; must be called inside a tokio runtime.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(16);

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if tx.send(line).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::warn!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
        });

        Self::from_lines(rx)
    }

    pub fn from_lines(lines: mpsc::Receiver<String>) -> Self {
        Self {
            lines: Mutex::new(lines),
        }
    }
}

#[async_trait]
impl Interface for TerminalInterface {
    async fn receive_input(&self) -> Option<String> {
        self.lines
            .lock()
            .await
            .recv()
            .await
            .map(|line| line.trim().to_string())
    }

    async fn send_output(&self, message: &str) {
        let mut stdout = tokio::io::stdout();
        let _ = stdout.write_all(message.as_bytes()).await;
        let _ = stdout.write_all(b"\n").await;
        let _ = stdout.flush().await;
    }

    async fn request_approval(&self, action: &str) -> bool {
        self.send_output(&format!("⚠️  Approval required: {}", action))
            .await;
        self.send_output("Approve? (y/n): ").await;

        if let Some(response) = self.receive_input().await {
            response.to_lowercase().starts_with('y')
        } else {
            false
        }
    }

    async fn show_status(&self, status: &str) {
        self.send_output(&format!("ℹ️  {}", status)).await;
    }

    async fn emit(&self, event: AssistantEvent) {
        match event {
            AssistantEvent::ListeningStarted => self.show_status("🎤 Listening...").await,
            AssistantEvent::ListeningStopped => self.show_status("Stopped listening").await,
            AssistantEvent::CommandProcessed {
                command, response, ..
            } => {
                self.send_output(&format!("🗣️  {}", command)).await;
                self.send_output(&format!("🤖 {}", response)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lines_are_trimmed_until_closed() {
        let (tx, rx) = mpsc::channel(4);
        let terminal = TerminalInterface::from_lines(rx);

        tx.send("  status \n".to_string()).await.unwrap();
        drop(tx);

        assert_eq!(terminal.receive_input().await.as_deref(), Some("status"));
        assert_eq!(terminal.receive_input().await, None);
    }

    #[tokio::test]
    async fn test_approval_reads_answer() {
        let (tx, rx) = mpsc::channel(4);
        let terminal = TerminalInterface::from_lines(rx);

        tx.send("Yes".to_string()).await.unwrap();
        tx.send("n".to_string()).await.unwrap();
        drop(tx);

        assert!(terminal.request_approval("run calc").await);
        assert!(!terminal.request_approval("run calc").await);
        assert!(!terminal.request_approval("run calc").await);
    }
}
