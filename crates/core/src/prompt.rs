use genx_executor::SystemFacts;
use genx_policy::Platform;

const WINDOWS_CHEAT_SHEET: &str = "Windows Commands:
- Open calculator: calc
- Open notepad: notepad
- Show files: dir
- Show current time: echo %time%
- Show current date: date /t
- Create file: echo. > filename.txt
- Create folder: mkdir foldername
- Open browser: start chrome
- Open file explorer: explorer";

const DARWIN_CHEAT_SHEET: &str = "macOS Commands:
- Open calculator: open -a Calculator
- Open text editor: open -a TextEdit
- Show files: ls -la
- Show current time: date
- Create file: touch filename.txt
- Create folder: mkdir foldername
- Open browser: open -a \"Google Chrome\"
- Open finder: open .";

const LINUX_CHEAT_SHEET: &str = "Linux Commands:
- Open calculator: gnome-calculator
- Open text editor: gedit
- Show files: ls -la
- Show current time: date
- Create file: touch filename.txt
- Create folder: mkdir foldername
- Open browser: firefox
- Open file manager: nautilus";

/// Worked examples as (user request, expected answer) pairs.
pub fn examples(platform: &Platform) -> [(&'static str, &'static str); 3] {
    let calculator = if platform.is_windows() {
        "calc"
    } else if platform.is_darwin() {
        "open -a Calculator"
    } else {
        "gnome-calculator"
    };

    let (files, time) = if platform.is_windows() {
        ("dir", "echo %time%")
    } else {
        ("ls -la", "date")
    };

    [
        ("open calculator", calculator),
        ("show files", files),
        ("what time is it", time),
    ]
}

pub fn cheat_sheet(platform: &Platform) -> &'static str {
    if platform.is_windows() {
        WINDOWS_CHEAT_SHEET
    } else if platform.is_darwin() {
        DARWIN_CHEAT_SHEET
    } else {
        LINUX_CHEAT_SHEET
    }
}

/// Build the single-message prompt for one user request.
///
/// `platform` selects the cheat sheet and examples; it is normally the same
/// as `facts.platform`.
pub fn build_prompt(user_input: &str, facts: &SystemFacts, platform: &Platform) -> String {
    let examples = examples(platform)
        .iter()
        .map(|(request, answer)| format!("- User: \"{}\" → Response: \"{}\"", request, answer))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are GenX, a desktop AI assistant. The user is on {platform} system.

User request: \"{user_input}\"

System Info:
- Platform: {platform}
- Architecture: {arch}
- CPU Cores: {cores}
- Total Memory: {memory}GB
- Username: {username}

IMPORTANT: If the user wants to do something that requires a system command, provide ONLY the command to execute.

Platform-specific commands:
{cheat_sheet}

Examples:
{examples}

If it's a question that doesn't need a command, just answer normally.

Respond with either:
1. Just the command if action is needed
2. A helpful answer if it's just a question",
        platform = platform.identifier(),
        user_input = user_input,
        arch = facts.arch,
        cores = facts.cpu_cores,
        memory = facts.total_memory_gb(),
        username = facts.username,
        cheat_sheet = cheat_sheet(platform),
        examples = examples,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts() -> SystemFacts {
        SystemFacts {
            platform: Platform::Linux,
            arch: "x86_64".to_string(),
            cpu_cores: 8,
            total_memory_bytes: 16 * 1024 * 1024 * 1024 - 1,
            free_memory_bytes: 0,
            uptime_seconds: 0,
            hostname: "devbox".to_string(),
            username: "sam".to_string(),
            home_dir: "/home/sam".to_string(),
            temp_dir: "/tmp".to_string(),
        }
    }

    #[test]
    fn test_windows_prompt_uses_windows_answers() {
        let prompt = build_prompt("open calculator", &facts(), &Platform::Windows);

        assert!(prompt.contains("The user is on win32 system."));
        assert!(prompt.contains("User request: \"open calculator\""));
        assert!(prompt.contains("Windows Commands:"));
        assert!(prompt.contains("- User: \"open calculator\" → Response: \"calc\""));
        assert!(prompt.contains("- User: \"what time is it\" → Response: \"echo %time%\""));
    }

    #[test]
    fn test_prompt_embeds_system_facts() {
        let prompt = build_prompt("hello", &facts(), &Platform::Linux);

        assert!(prompt.contains("- Architecture: x86_64"));
        assert!(prompt.contains("- CPU Cores: 8"));
        assert!(prompt.contains("- Total Memory: 16GB"));
        assert!(prompt.contains("- Username: sam"));
        assert!(prompt.contains("Linux Commands:"));
    }

    #[test]
    fn test_other_platforms_use_linux_sheet() {
        let platform = Platform::Other("freebsd".to_string());
        assert_eq!(cheat_sheet(&platform), LINUX_CHEAT_SHEET);
        assert_eq!(examples(&platform)[0].1, "gnome-calculator");
        assert_eq!(examples(&Platform::Darwin)[0].1, "open -a Calculator");
        assert_eq!(examples(&Platform::Darwin)[2].1, "date");
    }
}
