use serde::{Deserialize, Serialize};

/// Listening and speaking are independent flags; both may be set at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceSession {
    pub is_listening: bool,
    pub is_speaking: bool,
}
