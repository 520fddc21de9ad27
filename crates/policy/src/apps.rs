//! Logical application names mapped to per-platform launch targets.

use crate::platform::Platform;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalApp {
    Calculator,
    Notepad,
    Browser,
    Chrome,
    Firefox,
    Vscode,
    Terminal,
    FileManager,
    SystemMonitor,
}

impl LogicalApp {
    pub fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "calculator" | "calc" => Some(Self::Calculator),
            "notepad" | "texteditor" | "editor" => Some(Self::Notepad),
            "browser" => Some(Self::Browser),
            "chrome" | "googlechrome" => Some(Self::Chrome),
            "firefox" => Some(Self::Firefox),
            "vscode" | "code" | "visualstudiocode" => Some(Self::Vscode),
            "terminal" => Some(Self::Terminal),
            "filemanager" | "explorer" | "finder" | "files" => Some(Self::FileManager),
            "systemmonitor" | "taskmanager" | "activitymonitor" => Some(Self::SystemMonitor),
            _ => None,
        }
    }
}

enum Family {
    Windows,
    Darwin,
    Linux,
}

impl From<&Platform> for Family {
    fn from(platform: &Platform) -> Self {
        if platform.is_windows() {
            Family::Windows
        } else if platform.is_darwin() {
            Family::Darwin
        } else {
            Family::Linux
        }
    }
}

/// Launch target for `app` on `platform`.
///
/// Windows and Linux targets are executables, Darwin targets are
/// application bundle names meant for `open -a`.
pub fn launch_target(platform: &Platform, app: LogicalApp) -> &'static str {
    use LogicalApp::*;

    match (Family::from(platform), app) {
        (Family::Windows, Calculator) => "calc",
        (Family::Windows, Notepad) => "notepad",
        (Family::Windows, Browser) => "msedge",
        (Family::Windows, Chrome) => "chrome",
        (Family::Windows, Firefox) => "firefox",
        (Family::Windows, Vscode) => "code",
        (Family::Windows, Terminal) => "cmd",
        (Family::Windows, FileManager) => "explorer",
        (Family::Windows, SystemMonitor) => "taskmgr",

        (Family::Darwin, Calculator) => "Calculator",
        (Family::Darwin, Notepad) => "TextEdit",
        (Family::Darwin, Browser) => "Safari",
        (Family::Darwin, Chrome) => "Google Chrome",
        (Family::Darwin, Firefox) => "Firefox",
        (Family::Darwin, Vscode) => "Visual Studio Code",
        (Family::Darwin, Terminal) => "Terminal",
        (Family::Darwin, FileManager) => "Finder",
        (Family::Darwin, SystemMonitor) => "Activity Monitor",

        (Family::Linux, Calculator) => "gnome-calculator",
        (Family::Linux, Notepad) => "gedit",
        (Family::Linux, Browser) => "firefox",
        (Family::Linux, Chrome) => "google-chrome",
        (Family::Linux, Firefox) => "firefox",
        (Family::Linux, Vscode) => "code",
        (Family::Linux, Terminal) => "gnome-terminal",
        (Family::Linux, FileManager) => "nautilus",
        (Family::Linux, SystemMonitor) => "gnome-system-monitor",
    }
}
