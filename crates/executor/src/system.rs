//! Platform-aware helpers layered on the process runner.

use crate::process_runner::{CommandResult, ProcessRunner};
use genx_policy::{launch_target, LogicalApp, Platform};
use std::sync::Arc;

pub struct SystemCommands {
    runner: Arc<ProcessRunner>,
    platform: Platform,
}

impl SystemCommands {
    pub fn new(runner: Arc<ProcessRunner>, platform: Platform) -> Self {
        Self { runner, platform }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Launch an application by logical name ("calculator") or raw name.
    pub async fn open_application(&self, app: &str) -> CommandResult {
        match self.launch_command(app) {
            Some((command, args)) => self.runner.execute(&command, Some(&args)).await,
            None => CommandResult::failure("Unsupported platform"),
        }
    }

    pub async fn running_processes(&self) -> CommandResult {
        let command = if self.platform.is_windows() {
            "tasklist"
        } else {
            "ps aux"
        };
        self.runner.execute(command, None).await
    }

    pub async fn kill_process(&self, name: &str) -> CommandResult {
        if self.platform.is_windows() {
            let args = vec!["/F".to_string(), "/IM".to_string(), name.to_string()];
            self.runner.execute("taskkill", Some(&args)).await
        } else {
            self.runner
                .execute("pkill", Some(&[name.to_string()]))
                .await
        }
    }

    pub async fn network_info(&self) -> CommandResult {
        let command = if self.platform.is_windows() {
            "ipconfig"
        } else {
            "ifconfig"
        };
        self.runner.execute(command, None).await
    }

    pub async fn disk_usage(&self) -> CommandResult {
        let command = if self.platform.is_windows() {
            "dir"
        } else {
            "df -h"
        };
        self.runner.execute(command, None).await
    }

    fn launch_command(&self, app: &str) -> Option<(String, Vec<String>)> {
        let app = app.trim();
        let target = LogicalApp::parse(app)
            .map(|logical| launch_target(&self.platform, logical).to_string())
            .unwrap_or_else(|| app.to_string());

        match &self.platform {
            Platform::Windows => Some((
                "start".to_string(),
                vec!["\"\"".to_string(), quote_if_spaced(&target)],
            )),
            Platform::Darwin => Some((
                "open".to_string(),
                vec!["-a".to_string(), quote_if_spaced(&target)],
            )),
            Platform::Linux => Some((target.to_lowercase(), Vec::new())),
            Platform::Other(_) => None,
        }
    }
}

fn quote_if_spaced(value: &str) -> String {
    if value.contains(char::is_whitespace) {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(platform: Platform) -> SystemCommands {
        SystemCommands::new(Arc::new(ProcessRunner::new()), platform)
    }

    #[test]
    fn test_launch_command_per_platform() {
        let (cmd, args) = commands(Platform::Windows)
            .launch_command("calculator")
            .unwrap();
        assert_eq!(cmd, "start");
        assert_eq!(args, vec!["\"\"", "calc"]);

        let (cmd, args) = commands(Platform::Darwin).launch_command("chrome").unwrap();
        assert_eq!(cmd, "open");
        assert_eq!(args, vec!["-a", "\"Google Chrome\""]);

        let (cmd, args) = commands(Platform::Linux).launch_command("Gedit").unwrap();
        assert_eq!(cmd, "gedit");
        assert!(args.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_platform() {
        let result = commands(Platform::Other("haiku".to_string()))
            .open_application("calculator")
            .await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Unsupported platform"));
    }
}
