use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    ToggleListening,
    StopListening,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HotkeyError {
    #[error("Invalid accelerator: {0}")]
    Invalid(String),
    #[error("Accelerator already registered: {0}")]
    AlreadyRegistered(String),
}

/// Global shortcut binding contract.
pub trait HotkeyRegistry: Send + Sync {
    fn register(&self, accelerator: &str, action: HotkeyAction) -> Result<(), HotkeyError>;
    fn unregister(&self, accelerator: &str) -> bool;
    fn unregister_all(&self);
    fn resolve(&self, accelerator: &str) -> Option<HotkeyAction>;
}

/// Registry for shortcuts typed into the terminal, e.g. `ctrl+shift+g`.
/// `CommandOrControl` matches both `cmd` and `ctrl`.
#[derive(Default)]
pub struct LocalHotkeys {
    bindings: Mutex<HashMap<String, HotkeyAction>>,
}

impl LocalHotkeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bindings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.lock().is_empty()
    }
}

impl HotkeyRegistry for LocalHotkeys {
    fn register(&self, accelerator: &str, action: HotkeyAction) -> Result<(), HotkeyError> {
        let key = normalize(accelerator)?;
        let mut bindings = self.bindings.lock();
        if bindings.contains_key(&key) {
            return Err(HotkeyError::AlreadyRegistered(accelerator.to_string()));
        }
        bindings.insert(key, action);
        tracing::info!("Registered hotkey {} -> {:?}", accelerator, action);
        Ok(())
    }

    fn unregister(&self, accelerator: &str) -> bool {
        match normalize(accelerator) {
            Ok(key) => self.bindings.lock().remove(&key).is_some(),
            Err(_) => false,
        }
    }

    fn unregister_all(&self) {
        self.bindings.lock().clear();
    }

    fn resolve(&self, accelerator: &str) -> Option<HotkeyAction> {
        let key = normalize(accelerator).ok()?;
        self.bindings.lock().get(&key).copied()
    }
}

fn normalize(accelerator: &str) -> Result<String, HotkeyError> {
    let parts: Vec<String> = accelerator
        .split('+')
        .map(|part| part.trim().to_lowercase())
        .collect();

    if parts.iter().any(String::is_empty) {
        return Err(HotkeyError::Invalid(accelerator.to_string()));
    }

    let (key, modifiers) = parts
        .split_last()
        .ok_or_else(|| HotkeyError::Invalid(accelerator.to_string()))?;

    let mut modifiers: Vec<&str> = modifiers
        .iter()
        .map(|m| match m.as_str() {
            "commandorcontrol" | "cmdorctrl" | "command" | "cmd" | "control" | "ctrl" => "ctrl",
            "option" | "alt" => "alt",
            "shift" => "shift",
            "super" | "meta" => "super",
            other => other,
        })
        .collect();
    modifiers.sort_unstable();
    modifiers.dedup();

    let mut normalized = modifiers.join("+");
    if !normalized.is_empty() {
        normalized.push('+');
    }
    normalized.push_str(key);
    Ok(normalized)
}
