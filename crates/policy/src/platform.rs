use serde::{Deserialize, Serialize};
use std::fmt;

/// Host platform as seen by prompts, the classifier and the launch helpers.
///
/// Identifiers follow the `win32` / `darwin` / `linux` convention the model
/// is prompted with. Anything else is carried verbatim in `Other` and treated
/// as Linux-like.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    Darwin,
    Linux,
    Other(String),
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Platform::Windows,
            "macos" => Platform::Darwin,
            "linux" => Platform::Linux,
            other => Platform::Other(other.to_string()),
        }
    }

    pub fn from_identifier(id: &str) -> Self {
        match id.trim().to_lowercase().as_str() {
            "win32" | "windows" => Platform::Windows,
            "darwin" | "macos" => Platform::Darwin,
            "linux" => Platform::Linux,
            other => Platform::Other(other.to_string()),
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Platform::Windows => "win32",
            Platform::Darwin => "darwin",
            Platform::Linux => "linux",
            Platform::Other(id) => id,
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Platform::Windows)
    }

    pub fn is_darwin(&self) -> bool {
        matches!(self, Platform::Darwin)
    }

    /// Linux proper plus every platform without its own branch.
    pub fn is_linux_like(&self) -> bool {
        matches!(self, Platform::Linux | Platform::Other(_))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}
