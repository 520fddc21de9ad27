//! Heuristic that decides whether a model reply is a single shell invocation.
//!
//! The recognizers are deliberately permissive. A false positive is only a
//! proposal: nothing runs until the user approves it. A false negative
//! degrades to showing the reply as prose.

use crate::platform::Platform;
use regex::Regex;
use std::sync::LazyLock;

/// Replies longer than this are always prose.
pub const MAX_COMMAND_LEN: usize = 100;

static WINDOWS_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(start|cmd|powershell|tasklist|systeminfo|echo\s+%)").unwrap()
});

static DARWIN_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(open|say|osascript)").unwrap());

static LINUX_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(gnome-|kde-|xdg-open)").unwrap());

static GENERIC_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // token with optional arguments
        r"^[a-zA-Z0-9\-_.]+(\s+[^\n]*)?$",
        r"(?i)^(dir|ls|cat|echo|touch|mkdir|cd|pwd|whoami|date|time)",
        r"(?i)^(calc|notepad|code|chrome|firefox|explorer|nautilus)",
        r"(?i)^(open\s+-a|start\s+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandClassifier;

impl CommandClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn looks_like_command(&self, response: &str, platform: &Platform) -> bool {
        let trimmed = response.trim();

        if trimmed.chars().count() > MAX_COMMAND_LEN || trimmed.contains('\n') {
            return false;
        }

        let platform_prefix = if platform.is_windows() {
            &*WINDOWS_PREFIX
        } else if platform.is_darwin() {
            &*DARWIN_PREFIX
        } else {
            &*LINUX_PREFIX
        };

        if platform_prefix.is_match(trimmed) {
            return true;
        }

        GENERIC_PATTERNS.iter().any(|pattern| pattern.is_match(trimmed))
    }
}
