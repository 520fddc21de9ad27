use crate::metrics::Metrics;
use crate::prompt::build_prompt;
use crate::types::AiResponse;
use genx_executor::SystemFacts;
use genx_policy::{CommandClassifier, Platform};
use genx_providers::{GenerationConfig, GenerativeProvider, ProviderError};
use parking_lot::RwLock;
use std::sync::Arc;

pub const CONFIGURATION_PROMPT: &str =
    "Please configure your Gemini API key first. Use `/config set-key <key>` to add your key.";

/// Keys this short or shorter are treated as unset.
pub const MIN_API_KEY_LEN: usize = 10;

/// Turns user text into an [`AiResponse`] via the remote model.
pub struct AiGateway {
    provider: Arc<dyn GenerativeProvider>,
    classifier: CommandClassifier,
    generation: GenerationConfig,
    api_key: RwLock<Option<String>>,
    platform: Option<Platform>,
    metrics: Arc<Metrics>,
}

impl AiGateway {
    pub fn new(provider: Arc<dyn GenerativeProvider>, metrics: Arc<Metrics>) -> Self {
        Self {
            provider,
            classifier: CommandClassifier::new(),
            generation: GenerationConfig::default(),
            api_key: RwLock::new(None),
            platform: None,
            metrics,
        }
    }

    pub fn with_api_key(self, api_key: Option<String>) -> Self {
        *self.api_key.write() = api_key;
        self
    }

    /// Answer as if running on `platform` instead of the detected one.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn set_api_key(&self, api_key: &str) {
        *self.api_key.write() = Some(api_key.to_string());
        tracing::info!("Gemini API key updated");
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .read()
            .as_ref()
            .is_some_and(|key| key.len() > MIN_API_KEY_LEN)
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Never fails: configuration and provider problems come back as text.
    pub async fn process_command(&self, user_input: &str) -> AiResponse {
        let api_key = match self.api_key.read().clone() {
            Some(key) if key.len() > MIN_API_KEY_LEN => key,
            _ => return AiResponse::text(CONFIGURATION_PROMPT),
        };

        self.metrics.inc_ai_queries();

        match self.query(&api_key, user_input).await {
            Ok(response) => response,
            Err(e) => {
                self.metrics.inc_ai_failures();
                tracing::error!("Gemini processing error: {}", e);
                AiResponse::text(format!("Error: {}", e))
            }
        }
    }

    async fn query(&self, api_key: &str, user_input: &str) -> Result<AiResponse, ProviderError> {
        let facts = SystemFacts::gather_async().await;
        let platform = self.platform.clone().unwrap_or_else(|| facts.platform.clone());

        let prompt = build_prompt(user_input, &facts, &platform);
        tracing::debug!("Prompt for {}: {} chars", self.provider.name(), prompt.len());

        let text = self
            .provider
            .generate(api_key, &prompt, &self.generation)
            .await?
            .trim()
            .to_string();

        let command = self
            .classifier
            .looks_like_command(&text, &platform)
            .then(|| text.clone());

        if let Some(command) = &command {
            tracing::info!("Model proposed command: {}", command);
        }

        Ok(AiResponse { text, command })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct ScriptedProvider {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().len()
        }
    }

    #[async_trait]
    impl GenerativeProvider for ScriptedProvider {
        async fn generate(
            &self,
            _api_key: &str,
            prompt: &str,
            _config: &GenerationConfig,
        ) -> Result<String, ProviderError> {
            self.prompts.lock().push(prompt.to_string());
            self.reply.clone().map_err(ProviderError::Api)
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    const KEY: &str = "AIzaSy-valid-test-key";

    #[tokio::test]
    async fn test_short_key_skips_network() {
        let provider = ScriptedProvider::replying("calc");
        let gateway = AiGateway::new(provider.clone(), Metrics::new())
            .with_api_key(Some("0123456789".to_string()));

        assert!(!gateway.has_api_key());
        let response = gateway.process_command("open calculator").await;

        assert_eq!(response, AiResponse::text(CONFIGURATION_PROMPT));
        assert_eq!(provider.calls(), 0);
        assert_eq!(gateway.metrics().snapshot().ai_queries, 0);
    }

    #[tokio::test]
    async fn test_missing_key_then_set() {
        let provider = ScriptedProvider::replying("calc");
        let gateway = AiGateway::new(provider.clone(), Metrics::new())
            .with_platform(Platform::Windows);

        assert!(!gateway.has_api_key());
        gateway.set_api_key(KEY);
        assert!(gateway.has_api_key());

        let response = gateway.process_command("open calculator").await;
        assert_eq!(response.command.as_deref(), Some("calc"));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_command_reply_is_trimmed_and_classified() {
        let provider = ScriptedProvider::replying("  calc \n");
        let gateway = AiGateway::new(provider.clone(), Metrics::new())
            .with_api_key(Some(KEY.to_string()))
            .with_platform(Platform::Windows);

        let response = gateway.process_command("open calculator").await;
        assert_eq!(response.text, "calc");
        assert_eq!(response.command.as_deref(), Some("calc"));

        let prompt = provider.prompts.lock()[0].clone();
        assert!(prompt.contains("The user is on win32 system."));
        assert!(prompt.contains("Response: \"calc\""));
    }

    #[tokio::test]
    async fn test_prose_reply_has_no_command() {
        let reply = "It is a sunny day.\nEnjoy it while it lasts!";
        let provider = ScriptedProvider::replying(reply);
        let gateway = AiGateway::new(provider, Metrics::new())
            .with_api_key(Some(KEY.to_string()))
            .with_platform(Platform::Linux);

        let response = gateway.process_command("how is the weather").await;
        assert_eq!(response.text, reply);
        assert!(response.command.is_none());
    }

    #[tokio::test]
    async fn test_provider_error_becomes_text() {
        let provider = ScriptedProvider::failing("Gemini API error: 500 Internal Server Error");
        let gateway =
            AiGateway::new(provider, Metrics::new()).with_api_key(Some(KEY.to_string()));

        let response = gateway.process_command("hello").await;
        assert_eq!(
            response.text,
            "Error: Gemini API error: 500 Internal Server Error"
        );
        assert!(response.command.is_none());

        let snapshot = gateway.metrics().snapshot();
        assert_eq!(snapshot.ai_queries, 1);
        assert_eq!(snapshot.ai_failures, 1);
    }
}
