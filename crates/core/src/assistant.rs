use crate::gateway::AiGateway;
use crate::metrics::Metrics;
use crate::types::RequestOutcome;
use genx_executor::process_runner::TIMEOUT_MESSAGE;
use genx_executor::{CommandResult, ProcessRunner};
use genx_interfaces::{AssistantEvent, Interface};
use genx_memory::{CommandHistory, HistoryEntry};
use genx_voice::VoiceAdapter;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

pub const VOICE_ERROR_REPLY: &str = "Sorry, I encountered an error processing your command.";

/// Wires gateway, runner, voice and UI into the request pipeline.
///
/// Requests are handled one at a time by the caller; transcripts produced by
/// background listening are queued on a channel (see [`Assistant::transcripts`])
/// and fed back through [`Assistant::handle_voice_command`].
pub struct Assistant {
    gateway: Arc<AiGateway>,
    runner: Arc<ProcessRunner>,
    voice: Arc<VoiceAdapter>,
    interface: Arc<dyn Interface>,
    history: Arc<CommandHistory>,
    metrics: Arc<Metrics>,
    voice_enabled: AtomicBool,
    transcript_tx: mpsc::UnboundedSender<String>,
    transcript_rx: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
}

impl Assistant {
    pub fn new(
        gateway: Arc<AiGateway>,
        runner: Arc<ProcessRunner>,
        voice: Arc<VoiceAdapter>,
        interface: Arc<dyn Interface>,
        history: Arc<CommandHistory>,
    ) -> Self {
        let (transcript_tx, transcript_rx) = mpsc::unbounded_channel();
        let metrics = gateway.metrics().clone();

        Self {
            gateway,
            runner,
            voice,
            interface,
            history,
            metrics,
            voice_enabled: AtomicBool::new(true),
            transcript_tx,
            transcript_rx: Mutex::new(Some(transcript_rx)),
        }
    }

    pub fn gateway(&self) -> &Arc<AiGateway> {
        &self.gateway
    }

    pub fn runner(&self) -> &Arc<ProcessRunner> {
        &self.runner
    }

    pub fn voice(&self) -> &Arc<VoiceAdapter> {
        &self.voice
    }

    pub fn history(&self) -> &Arc<CommandHistory> {
        &self.history
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn set_voice_enabled(&self, enabled: bool) {
        self.voice_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled.load(Ordering::Relaxed)
    }

    /// Receiver for transcripts heard while listening. Handed out once.
    pub fn transcripts(&self) -> Option<mpsc::UnboundedReceiver<String>> {
        self.transcript_rx.lock().take()
    }

    /// Text request: ask the model, then run the proposed command if the user
    /// approves it.
    pub async fn handle_input(&self, input: &str) -> RequestOutcome {
        let input = input.trim();
        tracing::info!("Processing request: {}", input);

        let response = self.gateway.process_command(input).await;
        let execution = match &response.command {
            Some(command) => self.run_approved(command).await,
            None => None,
        };

        let mut entry = HistoryEntry::new(input, response.text.clone());
        if let Some(command) = &response.command {
            entry = entry.with_command(command, execution.as_ref().map(|r| r.success));
        }
        self.history.push(entry);

        RequestOutcome {
            response,
            execution,
        }
    }

    /// Transcript from listening: stop listening, run the request, read the
    /// answer aloud, then notify the UI.
    pub async fn handle_voice_command(&self, transcript: &str) -> RequestOutcome {
        tracing::info!("Voice command received: {}", transcript);
        self.stop_listening().await;

        let outcome = self.handle_input(transcript).await;

        if outcome.response.text.is_empty() {
            tracing::warn!("Empty response for voice command");
            self.say(VOICE_ERROR_REPLY).await;
        } else {
            self.say(&outcome.response.text).await;
        }

        self.interface
            .emit(AssistantEvent::command_processed(
                transcript,
                outcome.response.text.clone(),
            ))
            .await;

        outcome
    }

    pub async fn execute(&self, command: &str) -> CommandResult {
        self.metrics.inc_commands_executed();
        let result = self.runner.execute(command, None).await;

        if !result.success {
            self.metrics.inc_command_failures();
            if result.error.as_deref() == Some(TIMEOUT_MESSAGE) {
                self.metrics.inc_command_timeouts();
            }
        }
        result
    }

    /// Speak if voice output is enabled. Returns whether speech was attempted
    /// successfully.
    pub async fn say(&self, text: &str) -> bool {
        if !self.voice_enabled() {
            return false;
        }
        self.metrics.inc_speech_requests();
        self.voice.speak(text, None).await
    }

    pub async fn start_listening(&self) -> bool {
        let tx = self.transcript_tx.clone();
        let started = self
            .voice
            .start_listening(move |transcript| {
                if tx.send(transcript).is_err() {
                    tracing::warn!("Transcript dropped: no receiver");
                }
            })
            .await;

        if started {
            self.interface.emit(AssistantEvent::ListeningStarted).await;
        } else {
            tracing::warn!("Failed to start voice listening");
        }
        started
    }

    pub async fn stop_listening(&self) -> bool {
        let stopped = self.voice.stop_listening().await;
        self.interface.emit(AssistantEvent::ListeningStopped).await;
        stopped
    }

    pub async fn toggle_listening(&self) -> bool {
        if self.voice.is_listening() {
            self.stop_listening().await
        } else {
            self.start_listening().await
        }
    }

    /// Stop voice activity and kill every process still running.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down assistant");
        self.voice.cleanup().await;
        self.runner.cleanup();
    }

    async fn run_approved(&self, command: &str) -> Option<CommandResult> {
        if !self.interface.request_approval(command).await {
            tracing::info!("Command rejected by user: {}", command);
            self.interface.show_status("Command not executed").await;
            return None;
        }

        let result = self.execute(command).await;
        tracing::info!(
            "Command result: success={} exit_code={:?}",
            result.success,
            result.exit_code
        );
        Some(result)
    }
}
