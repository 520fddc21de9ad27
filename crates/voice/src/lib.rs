//! Voice I/O: listening and speaking session state bridged to platform
//! speech tools.
//!
//! Listening goes through a [`Recognizer`]; the default one is a simulation
//! that produces a canned phrase after a short random delay. Speaking shells
//! out to `say`, PowerShell's System.Speech, or `espeak`/`festival`.

pub mod adapter;
pub mod recognition;
pub mod session;
pub mod synthesis;

pub use adapter::VoiceAdapter;
pub use recognition::{Recognizer, SimulatedRecognizer, CANNED_PHRASES};
pub use session::VoiceSession;
pub use synthesis::{SpeechPlanner, SpeechStep, VoiceOptions};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Recognition failed: {0}")]
    Recognition(String),
}
