use crate::VoiceError;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Speech-to-text source. One call is one utterance: start, wait for a
/// transcript, stop.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self) -> Result<String, VoiceError>;

    fn name(&self) -> &str;
}

pub const CANNED_PHRASES: [&str; 15] = [
    "What time is it?",
    "Open calculator",
    "Show me the files in this folder",
    "What's my system information?",
    "Open Chrome browser",
    "Create a new file",
    "Show CPU usage",
    "What's today's date?",
    "Open Visual Studio Code",
    "List all running processes",
    "Show memory usage",
    "Open file explorer",
    "What's my IP address?",
    "Create a new folder",
    "Open terminal",
];

/// Stand-in for real speech recognition: after a random delay it "hears"
/// one of [`CANNED_PHRASES`].
pub struct SimulatedRecognizer {
    min_delay_ms: u64,
    max_delay_ms: u64,
}

impl SimulatedRecognizer {
    pub fn new() -> Self {
        Self::with_delay(3000, 5000)
    }

    pub fn with_delay(min_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            min_delay_ms,
            max_delay_ms: max_delay_ms.max(min_delay_ms),
        }
    }

    pub fn delay_range_ms(&self) -> (u64, u64) {
        (self.min_delay_ms, self.max_delay_ms)
    }
}

impl Default for SimulatedRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Recognizer for SimulatedRecognizer {
    async fn recognize(&self) -> Result<String, VoiceError> {
        let (delay_ms, phrase) = {
            let mut rng = rand::thread_rng();
            (
                rng.gen_range(self.min_delay_ms..=self.max_delay_ms),
                CANNED_PHRASES[rng.gen_range(0..CANNED_PHRASES.len())],
            )
        };

        tracing::info!("Voice recognition active - simulating speech input...");
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        tracing::info!("Simulated voice input: {}", phrase);

        Ok(phrase.to_string())
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
