use crate::recognition::{Recognizer, SimulatedRecognizer};
use crate::session::VoiceSession;
use crate::synthesis::{run_plan, speech_plan, SpeechOutcome, SpeechPlanner, VoiceOptions};
use genx_policy::Platform;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct ActiveSpeech {
    generation: u64,
    interrupt: oneshot::Sender<()>,
}

/// Owns the listening/speaking flags for one running assistant.
pub struct VoiceAdapter {
    platform: Platform,
    recognizer: Arc<dyn Recognizer>,
    initialized: AtomicBool,
    synthesizer: Mutex<Option<&'static str>>,
    session: Arc<Mutex<VoiceSession>>,
    listen_task: Mutex<Option<JoinHandle<()>>>,
    speech: Mutex<Option<ActiveSpeech>>,
    speech_generation: AtomicU64,
    planner: SpeechPlanner,
}

impl VoiceAdapter {
    pub fn new(platform: Platform) -> Self {
        Self::with_recognizer(platform, Arc::new(SimulatedRecognizer::new()))
    }

    pub fn with_recognizer(platform: Platform, recognizer: Arc<dyn Recognizer>) -> Self {
        Self {
            platform,
            recognizer,
            initialized: AtomicBool::new(false),
            synthesizer: Mutex::new(None),
            session: Arc::new(Mutex::new(VoiceSession::default())),
            listen_task: Mutex::new(None),
            speech: Mutex::new(None),
            speech_generation: AtomicU64::new(0),
            planner: speech_plan,
        }
    }

    /// Replace the platform synthesizer chain.
    pub fn with_planner(mut self, planner: SpeechPlanner) -> Self {
        self.planner = planner;
        self
    }

    /// Probe for a speech tool. A missing tool is logged and the adapter
    /// still comes up in degraded mode.
    pub async fn initialize(&self) -> bool {
        let candidates: &[&'static str] = if self.platform.is_darwin() {
            &["say"]
        } else if self.platform.is_windows() {
            &["powershell"]
        } else {
            &["espeak", "festival"]
        };

        let found = candidates
            .iter()
            .copied()
            .find(|tool| which::which(tool).is_ok());

        match found {
            Some(tool) => tracing::info!("Voice synthesis available via {}", tool),
            None => tracing::warn!(
                "No speech synthesizer found ({}), voice output will be silent",
                candidates.join(", ")
            ),
        }
        tracing::info!("Speech recognition backend: {}", self.recognizer.name());

        *self.synthesizer.lock() = found;
        self.initialized.store(true, Ordering::SeqCst);
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn synthesizer(&self) -> Option<&'static str> {
        *self.synthesizer.lock()
    }

    pub fn session(&self) -> VoiceSession {
        *self.session.lock()
    }

    pub fn is_listening(&self) -> bool {
        self.session.lock().is_listening
    }

    pub fn is_speaking(&self) -> bool {
        self.session.lock().is_speaking
    }

    /// Begin one recognition pass. `on_transcript` fires at most once, after
    /// the session has already gone back to idle. Returns `false` only when
    /// the adapter was never initialized.
    pub async fn start_listening<F>(&self, on_transcript: F) -> bool
    where
        F: FnOnce(String) + Send + 'static,
    {
        if !self.is_initialized() {
            tracing::warn!("Voice adapter not initialized, cannot start listening");
            return false;
        }

        {
            let mut session = self.session.lock();
            if session.is_listening {
                return true;
            }
            session.is_listening = true;
        }

        let session = Arc::clone(&self.session);
        let recognizer = Arc::clone(&self.recognizer);

        let task = tokio::spawn(async move {
            let result = recognizer.recognize().await;

            let still_listening = {
                let mut session = session.lock();
                let was = session.is_listening;
                session.is_listening = false;
                was
            };

            match result {
                Ok(transcript) if still_listening => on_transcript(transcript),
                Ok(transcript) => {
                    tracing::debug!("Dropping transcript after stop: {}", transcript)
                }
                Err(e) => tracing::warn!("Speech recognition failed: {}", e),
            }
        });

        if let Some(previous) = self.listen_task.lock().replace(task) {
            previous.abort();
        }

        tracing::info!("Started listening");
        true
    }

    pub async fn stop_listening(&self) -> bool {
        if let Some(task) = self.listen_task.lock().take() {
            task.abort();
        }

        let mut session = self.session.lock();
        if session.is_listening {
            tracing::info!("Stopped listening");
        }
        session.is_listening = false;
        true
    }

    /// Speak `text`, replacing any speech in progress. Synthesis failures are
    /// logged and still count as success.
    pub async fn speak(&self, text: &str, options: Option<&VoiceOptions>) -> bool {
        if !self.is_initialized() {
            tracing::warn!("Voice adapter not initialized, cannot speak");
            return false;
        }

        self.stop_speaking().await;

        let generation = self.speech_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (interrupt, mut interrupted) = oneshot::channel();
        *self.speech.lock() = Some(ActiveSpeech {
            generation,
            interrupt,
        });
        self.session.lock().is_speaking = true;

        let default_options = VoiceOptions::default();
        let plan = (self.planner)(&self.platform, text, options.unwrap_or(&default_options));

        match run_plan(plan, &mut interrupted).await {
            SpeechOutcome::Completed => tracing::debug!("Finished speaking"),
            SpeechOutcome::Interrupted => tracing::debug!("Speech interrupted"),
            SpeechOutcome::Failed(e) => {
                tracing::warn!("TTS not available, but continuing... ({})", e)
            }
        }

        // A newer speak call owns the flag once it has replaced our slot.
        let mut speech = self.speech.lock();
        if speech.as_ref().map(|s| s.generation) == Some(generation) {
            speech.take();
            self.session.lock().is_speaking = false;
        }

        true
    }

    pub async fn stop_speaking(&self) -> bool {
        if let Some(active) = self.speech.lock().take() {
            // The receiver is gone when the synthesizer already exited.
            let _ = active.interrupt.send(());
        }
        self.session.lock().is_speaking = false;
        true
    }

    pub async fn cleanup(&self) {
        self.stop_listening().await;
        self.stop_speaking().await;
    }
}
