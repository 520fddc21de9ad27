pub mod config;
pub mod repl;

use anyhow::{Context, Result};
use config::Config;
use genx_core::{AiGateway, Assistant, Metrics};
use genx_executor::{ProcessRunner, SystemCommands};
use genx_interfaces::{HotkeyAction, HotkeyRegistry, Interface, LocalHotkeys};
use genx_memory::{CommandHistory, ConfigStore};
use genx_policy::Platform;
use genx_providers::{GeminiProvider, GenerativeProvider};
use genx_voice::VoiceAdapter;
use std::sync::Arc;

pub const STOP_HOTKEY: &str = "Escape";

/// Fully wired application: the assistant plus the collaborators the REPL
/// talks to directly.
pub struct App {
    pub assistant: Arc<Assistant>,
    pub store: Arc<ConfigStore>,
    pub hotkeys: Arc<LocalHotkeys>,
    pub system: SystemCommands,
    pub config: Config,
}

impl App {
    /// Build against the real Gemini client and the detected platform.
    pub async fn build(
        config: Config,
        interface: Arc<dyn Interface>,
        env_api_key: Option<String>,
    ) -> Result<Self> {
        let provider = Arc::new(GeminiProvider::new(
            config.base_url.clone(),
            config.model.clone(),
        ));
        let platform = Platform::current();
        let voice = Arc::new(VoiceAdapter::new(platform.clone()));

        Self::build_with(config, interface, provider, voice, platform, env_api_key).await
    }

    pub async fn build_with(
        config: Config,
        interface: Arc<dyn Interface>,
        provider: Arc<dyn GenerativeProvider>,
        voice: Arc<VoiceAdapter>,
        platform: Platform,
        env_api_key: Option<String>,
    ) -> Result<Self> {
        config.validate()?;

        let store = ConfigStore::open(config.config_store_path())
            .await
            .with_context(|| {
                format!(
                    "Failed to open config store at {}",
                    config.config_store_path().display()
                )
            })?;
        let store = Arc::new(store);

        let api_key = config.resolve_api_key(env_api_key, store.api_key());
        let gateway = AiGateway::new(provider, Metrics::new())
            .with_api_key(api_key)
            .with_platform(platform.clone());

        if gateway.has_api_key() {
            tracing::info!("AI gateway initialized with API key");
        } else {
            tracing::info!("AI gateway initialized without API key - will need manual setup");
        }

        voice.initialize().await;

        let runner = Arc::new(ProcessRunner::with_timeout(config.command_timeout()));
        let system = SystemCommands::new(runner.clone(), platform);

        let assistant = Arc::new(Assistant::new(
            Arc::new(gateway),
            runner,
            voice,
            interface,
            Arc::new(CommandHistory::new(config.history_capacity)),
        ));
        assistant.set_voice_enabled(store.voice_enabled());

        let app = Self {
            assistant,
            store,
            hotkeys: Arc::new(LocalHotkeys::new()),
            system,
            config,
        };
        app.register_hotkeys();
        Ok(app)
    }

    /// Bind the configured toggle hotkey and `Escape`, replacing any previous
    /// bindings. Registration failures are logged.
    pub fn register_hotkeys(&self) {
        self.hotkeys.unregister_all();

        let toggle = self.store.hotkey();
        for (accelerator, action) in [
            (toggle.as_str(), HotkeyAction::ToggleListening),
            (STOP_HOTKEY, HotkeyAction::StopListening),
        ] {
            if let Err(e) = self.hotkeys.register(accelerator, action) {
                tracing::warn!("Failed to register hotkey {}: {}", accelerator, e);
            }
        }
    }

    pub async fn shutdown(&self) {
        self.hotkeys.unregister_all();
        self.assistant.shutdown().await;
    }
}
