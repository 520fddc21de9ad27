//! Interactive loop: REPL commands, hotkeys and free-text requests.

use crate::App;
use anyhow::{Context, Result};
use genx_core::RequestOutcome;
use genx_executor::{CommandResult, SystemFacts};
use genx_interfaces::{HotkeyAction, HotkeyRegistry, Interface};
use genx_memory::{KEY_GEMINI_API_KEY, KEY_HOTKEY, KEY_VOICE_ENABLED};
use genx_tools::FileOps;
use serde_json::Value;
use std::sync::Arc;

const HISTORY_SHOWN: usize = 10;

/// Marks a line as a REPL built-in rather than a request for the assistant.
pub const COMMAND_PREFIX: char = '/';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Repl {
    app: App,
    interface: Arc<dyn Interface>,
}

impl Repl {
    pub fn new(app: App, interface: Arc<dyn Interface>) -> Self {
        Self { app, interface }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub async fn run(&self) -> Result<()> {
        self.say_line("╔══════════════════════════════════════════════════════════════════╗")
            .await;
        self.say_line("║              GenX Desktop Assistant                              ║")
            .await;
        self.say_line("║  Commands: /help, /status, /listen, /say, /run, exit              ║")
            .await;
        self.say_line("╚══════════════════════════════════════════════════════════════════╝")
            .await;

        if !self.app.assistant.gateway().has_api_key() {
            self.interface
                .show_status(genx_core::CONFIGURATION_PROMPT)
                .await;
        }

        let mut transcripts = self
            .app
            .assistant
            .transcripts()
            .context("Transcript channel already taken")?;

        loop {
            tokio::select! {
                line = self.interface.receive_input() => {
                    let Some(line) = line else {
                        tracing::info!("Input closed");
                        break;
                    };
                    match self.handle_line(&line).await {
                        Ok(Flow::Exit) => break,
                        Ok(Flow::Continue) => {}
                        Err(e) => self.say_line(&format!("❌ Error: {:#}", e)).await,
                    }
                }
                Some(transcript) = transcripts.recv() => {
                    let outcome = self.app.assistant.handle_voice_command(&transcript).await;
                    self.print_outcome(&outcome).await;
                }
            }
        }

        Ok(())
    }

    pub async fn handle_line(&self, line: &str) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        if let Some(action) = self.app.hotkeys.resolve(line) {
            match action {
                HotkeyAction::ToggleListening => {
                    self.app.assistant.toggle_listening().await;
                }
                HotkeyAction::StopListening => {
                    self.app.assistant.stop_listening().await;
                    self.app.assistant.voice().stop_speaking().await;
                }
            }
            return Ok(Flow::Continue);
        }

        if matches!(line, "exit" | "quit") {
            self.say_line("👋 Goodbye!").await;
            return Ok(Flow::Exit);
        }

        // Only prefixed lines are built-ins; "open calculator" is a request.
        let Some(builtin) = line.strip_prefix(COMMAND_PREFIX) else {
            let outcome = self.app.assistant.handle_input(line).await;
            self.print_outcome(&outcome).await;
            return Ok(Flow::Continue);
        };

        let (command, rest) = split_word(builtin);
        match command {
            "exit" | "quit" => {
                self.say_line("👋 Goodbye!").await;
                return Ok(Flow::Exit);
            }
            "help" => self.print_help().await,
            "status" => self.print_status().await,
            "history" => self.print_history().await,
            "listen" => {
                if !self.app.assistant.start_listening().await {
                    self.say_line("❌ Voice input is not available").await;
                }
            }
            "stop" => {
                self.app.assistant.stop_listening().await;
                self.app.assistant.voice().stop_speaking().await;
            }
            "say" if !rest.is_empty() => {
                if !self.app.assistant.say(rest).await {
                    self.say_line("🔇 Voice output is off").await;
                }
            }
            "run" if !rest.is_empty() => {
                let result = self.app.assistant.execute(rest).await;
                self.print_result(&result).await;
            }
            "file" if !rest.is_empty() => {
                let (operation, rest) = split_word(rest);
                let (path, data) = split_word(rest);
                let data = (!data.is_empty()).then_some(data);
                let result = FileOps::perform_named(operation, path, data).await;
                self.print_result(&result).await;
            }
            "sysinfo" => {
                let facts = SystemFacts::gather_async().await;
                self.say_line(&facts.to_concise_string()).await;
            }
            "open" if !rest.is_empty() => {
                let result = self.app.system.open_application(rest).await;
                self.print_result(&result).await;
            }
            "ps" => {
                let result = self.app.system.running_processes().await;
                self.print_result(&result).await;
            }
            "kill" if !rest.is_empty() => {
                let result = self.app.system.kill_process(rest).await;
                self.print_result(&result).await;
            }
            "net" => {
                let result = self.app.system.network_info().await;
                self.print_result(&result).await;
            }
            "disk" => {
                let result = self.app.system.disk_usage().await;
                self.print_result(&result).await;
            }
            "config" => self.handle_config(rest).await?,
            _ => {
                self.say_line(&format!(
                    "Unknown command: {}{} (try {}help)",
                    COMMAND_PREFIX, command, COMMAND_PREFIX
                ))
                .await
            }
        }

        Ok(Flow::Continue)
    }

    async fn handle_config(&self, args: &str) -> Result<()> {
        let (action, rest) = split_word(args);
        let (key, value) = split_word(rest);
        let store = &self.app.store;

        match action {
            "get" if !key.is_empty() => {
                let shown = match key {
                    KEY_GEMINI_API_KEY => store.api_key().map(|k| Value::from(mask(&k))),
                    _ => store.get(key),
                };
                match shown {
                    Some(value) => self.say_line(&format!("{} = {}", key, value)).await,
                    None => self.say_line(&format!("{} is not set", key)).await,
                }
            }
            "set" if !key.is_empty() && !value.is_empty() => {
                let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
                store.set(key, value).await?;
                self.apply_setting(key).await;
                self.say_line(&format!("✅ {} updated", key)).await;
            }
            "delete" if !key.is_empty() => {
                if store.delete(key).await? {
                    self.apply_setting(key).await;
                    self.say_line(&format!("✅ {} deleted", key)).await;
                } else {
                    self.say_line(&format!("{} is not set", key)).await;
                }
            }
            "set-key" => {
                let api_key = if key.is_empty() {
                    self.say_line("Enter Gemini API key:").await;
                    tokio::task::spawn_blocking(rpassword::read_password)
                        .await?
                        .context("Failed to read API key")?
                } else {
                    key.to_string()
                };
                self.set_api_key(api_key.trim()).await?;
            }
            _ => {
                self.say_line("Usage: /config get|set|delete <key> [value] | /config set-key [key]")
                    .await
            }
        }
        Ok(())
    }

    async fn set_api_key(&self, api_key: &str) -> Result<()> {
        if api_key.is_empty() {
            self.say_line("❌ API key cannot be empty").await;
            return Ok(());
        }

        self.app
            .store
            .set(KEY_GEMINI_API_KEY, Value::from(api_key))
            .await?;
        self.app.assistant.gateway().set_api_key(api_key);

        if self.app.assistant.gateway().has_api_key() {
            self.say_line("✅ Gemini API key saved").await;
        } else {
            self.say_line("⚠️  API key saved, but it looks too short to be valid")
                .await;
        }
        Ok(())
    }

    /// Push a changed store value into the running components.
    async fn apply_setting(&self, key: &str) {
        match key {
            KEY_HOTKEY => self.app.register_hotkeys(),
            KEY_VOICE_ENABLED => self
                .app
                .assistant
                .set_voice_enabled(self.app.store.voice_enabled()),
            KEY_GEMINI_API_KEY => {
                let key = self.app.store.api_key().unwrap_or_default();
                self.app.assistant.gateway().set_api_key(&key);
            }
            _ => {}
        }
    }

    async fn print_help(&self) {
        let hotkey = self.app.store.hotkey();
        let help = format!(
            "\n📖 Available Commands:
  exit, quit                  - Exit the assistant
  /help                       - Show this help message
  /status                     - Show assistant status
  /history                    - Show recent requests
  /listen, /stop              - Start or stop voice input (also stops speech)
  /say <text>                 - Speak text aloud
  /run <command>              - Execute a shell command
  /file <op> <path> [data]    - File operation (read, write, create, mkdir, delete,
                                rmdir, list, stat, copy, move)
  /sysinfo                    - Show system information
  /open <app>                 - Launch an application
  /ps, /net, /disk            - Processes, network and disk usage
  /kill <name>                - Kill processes by name
  /config get|set|delete <key> [value]
  /config set-key [key]       - Save the Gemini API key
  {}  - Toggle listening, {} - stop listening
\n💡 Anything else is sent to the assistant\n",
            hotkey,
            crate::STOP_HOTKEY
        );
        self.say_line(&help).await;
    }

    async fn print_status(&self) {
        let assistant = &self.app.assistant;
        let metrics = assistant.metrics().snapshot();
        let session = assistant.voice().session();

        let status = format!(
            "\n📊 Assistant Status:
  Provider: {} ({})
  API key: {}
  Voice: listening={} speaking={} output={} synthesizer={}
  Running processes: {}
  AI queries: {} ({} failed, {:.0}% success)
  Commands: {} executed, {} failed, {} timed out
  Speech requests: {}
  History: {}/{}\n",
            assistant.gateway().provider_name(),
            self.app.config.model,
            if assistant.gateway().has_api_key() {
                "configured"
            } else {
                "missing"
            },
            session.is_listening,
            session.is_speaking,
            if assistant.voice_enabled() { "on" } else { "off" },
            assistant.voice().synthesizer().unwrap_or("none"),
            assistant.runner().running_count(),
            metrics.ai_queries,
            metrics.ai_failures,
            metrics.ai_success_rate() * 100.0,
            metrics.commands_executed,
            metrics.command_failures,
            metrics.command_timeouts,
            metrics.speech_requests,
            assistant.history().len(),
            assistant.history().capacity(),
        );
        self.say_line(&status).await;
    }

    async fn print_history(&self) {
        let entries = self.app.assistant.history().recent(HISTORY_SHOWN);
        if entries.is_empty() {
            self.say_line("No requests yet").await;
            return;
        }

        for entry in entries {
            let command = match (&entry.command, entry.command_succeeded) {
                (Some(command), Some(true)) => format!(" [ran: {}]", command),
                (Some(command), Some(false)) => format!(" [failed: {}]", command),
                (Some(command), None) => format!(" [skipped: {}]", command),
                (None, _) => String::new(),
            };
            self.say_line(&format!("• {} → {}{}", entry.query, entry.response, command))
                .await;
        }
    }

    async fn print_outcome(&self, outcome: &RequestOutcome) {
        self.say_line(&format!("\n{}\n", outcome.response.text)).await;
        if let Some(result) = &outcome.execution {
            self.print_result(result).await;
        }
    }

    async fn print_result(&self, result: &CommandResult) {
        if result.success {
            if result.output.is_empty() {
                self.say_line("✅ Done").await;
            } else {
                self.say_line(&result.output).await;
            }
        } else {
            if !result.output.is_empty() {
                self.say_line(&result.output).await;
            }
            let error = result.error.as_deref().unwrap_or("Command failed");
            match result.exit_code {
                Some(code) => self.say_line(&format!("❌ {} (exit code {})", error, code)).await,
                None => self.say_line(&format!("❌ {}", error)).await,
            }
        }
    }

    async fn say_line(&self, text: &str) {
        self.interface.send_output(text).await;
    }
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{}…", visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_word() {
        assert_eq!(
            split_word("file write /tmp/a hello world"),
            ("file", "write /tmp/a hello world")
        );
        assert_eq!(split_word("  status  "), ("status", ""));
        assert_eq!(split_word(""), ("", ""));
    }

    #[test]
    fn test_mask_hides_key() {
        assert_eq!(mask("AIzaSy-secret"), "AIza…");
    }
}
