use genx_policy::Platform;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceOptions {
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
    pub volume: Option<f32>,
    pub voice: Option<String>,
}

/// One synthesizer invocation. `stdin` is piped to the process when set.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechStep {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

/// Builds the synthesizer chain for one utterance.
pub type SpeechPlanner = fn(&Platform, &str, &VoiceOptions) -> Vec<SpeechStep>;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SpeechOutcome {
    Completed,
    Interrupted,
    Failed(String),
}

/// Synthesizers to try in order for `platform`. Only the Linux-like chain has
/// a fallback.
pub fn speech_plan(platform: &Platform, text: &str, options: &VoiceOptions) -> Vec<SpeechStep> {
    if platform.is_darwin() {
        let mut args = Vec::new();
        if let Some(rate) = options.rate {
            args.push("-r".to_string());
            args.push((rate.round() as i64).to_string());
        }
        if let Some(voice) = &options.voice {
            args.push("-v".to_string());
            args.push(voice.clone());
        }
        args.push(text.to_string());

        vec![SpeechStep {
            program: "say".to_string(),
            args,
            stdin: None,
        }]
    } else if platform.is_windows() {
        let rate = options.rate.map(|r| r.round() as i64).unwrap_or(0).clamp(-10, 10);
        let volume = options
            .volume
            .map(|v| v.round() as i64)
            .unwrap_or(100)
            .clamp(0, 100);
        let script = format!(
            "Add-Type -AssemblyName System.Speech; \
             $synth = New-Object System.Speech.Synthesis.SpeechSynthesizer; \
             $synth.Rate = {}; \
             $synth.Volume = {}; \
             $synth.Speak('{}');",
            rate,
            volume,
            text.replace('\'', "''")
        );

        vec![SpeechStep {
            program: "powershell".to_string(),
            args: vec!["-Command".to_string(), script],
            stdin: None,
        }]
    } else {
        vec![
            SpeechStep {
                program: "espeak".to_string(),
                args: vec![text.to_string()],
                stdin: None,
            },
            SpeechStep {
                program: "festival".to_string(),
                args: vec!["--tts".to_string()],
                stdin: Some(text.to_string()),
            },
        ]
    }
}

/// Run the chain until one step completes or the speech is interrupted.
pub(crate) async fn run_plan(
    plan: Vec<SpeechStep>,
    interrupt: &mut oneshot::Receiver<()>,
) -> SpeechOutcome {
    let mut last_error = "no synthesizer available".to_string();

    for step in plan {
        match run_step(&step, interrupt).await {
            SpeechOutcome::Failed(e) => {
                tracing::debug!("Synthesizer {} failed: {}", step.program, e);
                last_error = format!("{}: {}", step.program, e);
            }
            outcome => return outcome,
        }
    }

    SpeechOutcome::Failed(last_error)
}

async fn run_step(step: &SpeechStep, interrupt: &mut oneshot::Receiver<()>) -> SpeechOutcome {
    let mut cmd = Command::new(&step.program);
    cmd.args(&step.args)
        .stdin(if step.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return SpeechOutcome::Failed(e.to_string()),
    };

    if let (Some(text), Some(mut stdin)) = (&step.stdin, child.stdin.take()) {
        if let Err(e) = stdin.write_all(text.as_bytes()).await {
            tracing::debug!("Failed to feed {}: {}", step.program, e);
        }
    }

    tokio::select! {
        status = child.wait() => match status {
            Ok(status) if status.success() => SpeechOutcome::Completed,
            Ok(status) => SpeechOutcome::Failed(format!("exited with {}", status)),
            Err(e) => SpeechOutcome::Failed(e.to_string()),
        },
        _ = &mut *interrupt => {
            if let Err(e) = child.kill().await {
                tracing::warn!("Failed to stop {}: {}", step.program, e);
            }
            SpeechOutcome::Interrupted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_darwin_plan_uses_say_with_options() {
        let options = VoiceOptions {
            rate: Some(180.4),
            voice: Some("Samantha".to_string()),
            ..Default::default()
        };
        let plan = speech_plan(&Platform::Darwin, "hello", &options);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].program, "say");
        assert_eq!(plan[0].args, vec!["-r", "180", "-v", "Samantha", "hello"]);
    }

    #[test]
    fn test_windows_plan_escapes_quotes() {
        let plan = speech_plan(&Platform::Windows, "it's done", &VoiceOptions::default());

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].program, "powershell");
        let script = &plan[0].args[1];
        assert!(script.contains("$synth.Speak('it''s done');"));
        assert!(script.contains("$synth.Rate = 0;"));
        assert!(script.contains("$synth.Volume = 100;"));
    }

    #[test]
    fn test_linux_plan_falls_back_to_festival() {
        let plan = speech_plan(&Platform::Linux, "hi", &VoiceOptions::default());

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].program, "espeak");
        assert_eq!(plan[1].program, "festival");
        assert_eq!(plan[1].stdin.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_missing_synthesizers_fail_softly() {
        let (_tx, mut rx) = oneshot::channel();
        let plan = vec![
            SpeechStep {
                program: "genx-missing-tts-a".to_string(),
                args: vec![],
                stdin: None,
            },
            SpeechStep {
                program: "genx-missing-tts-b".to_string(),
                args: vec![],
                stdin: Some("x".to_string()),
            },
        ];

        match run_plan(plan, &mut rx).await {
            SpeechOutcome::Failed(e) => assert!(e.starts_with("genx-missing-tts-b")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fallback_runs_after_nonzero_exit() {
        let (_tx, mut rx) = oneshot::channel();
        let plan = vec![
            SpeechStep {
                program: "false".to_string(),
                args: vec![],
                stdin: None,
            },
            SpeechStep {
                program: "cat".to_string(),
                args: vec![],
                stdin: Some("spoken".to_string()),
            },
        ];

        assert_eq!(run_plan(plan, &mut rx).await, SpeechOutcome::Completed);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_interrupt_kills_synthesizer() {
        let (tx, mut rx) = oneshot::channel();
        let plan = vec![SpeechStep {
            program: "sleep".to_string(),
            args: vec!["5".to_string()],
            stdin: None,
        }];

        let started = std::time::Instant::now();
        let speaking = tokio::spawn(async move { run_plan(plan, &mut rx).await });
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        tx.send(()).unwrap();

        assert_eq!(speaking.await.unwrap(), SpeechOutcome::Interrupted);
        assert!(started.elapsed() < std::time::Duration::from_secs(4));
    }
}
