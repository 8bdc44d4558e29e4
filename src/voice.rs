//! Optional speech capabilities.
//!
//! Both directions are best-effort: a capability is either present (built
//! from config) or absent, and failures are logged by the caller, never shown
//! to the user.

use crate::config::VoiceConfig;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

/// Text-to-speech.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn speak(&self, text: &str) -> Result<()>;
}

/// Speech-to-text. `Ok(None)` means nothing was heard.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn listen(&self) -> Result<Option<String>>;
}

/// Runs an external program; the text to speak is appended as the last arg.
pub struct CommandSynthesizer {
    argv: Vec<String>,
}

impl CommandSynthesizer {
    pub fn new(argv: Vec<String>) -> Option<Self> {
        (!argv.is_empty()).then_some(Self { argv })
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    async fn speak(&self, text: &str) -> Result<()> {
        let output = Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .arg(text)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.argv[0]))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} exited with {}: {}", self.argv[0], output.status, stderr.trim());
        }
        Ok(())
    }
}

/// Runs an external program and takes its trimmed stdout as the transcript.
pub struct CommandRecognizer {
    argv: Vec<String>,
}

impl CommandRecognizer {
    pub fn new(argv: Vec<String>) -> Option<Self> {
        (!argv.is_empty()).then_some(Self { argv })
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    async fn listen(&self) -> Result<Option<String>> {
        let output = Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.argv[0]))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} exited with {}: {}", self.argv[0], output.status, stderr.trim());
        }
        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!transcript.is_empty()).then_some(transcript))
    }
}

/// The speech capabilities available to a chat session.
#[derive(Clone, Default)]
pub struct Voice {
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    pub recognizer: Option<Arc<dyn SpeechRecognizer>>,
    pub speak_answers: bool,
}

impl Voice {
    pub fn from_config(config: &VoiceConfig) -> Self {
        let synthesizer = config
            .speak_command
            .clone()
            .and_then(CommandSynthesizer::new)
            .map(|s| Arc::new(s) as Arc<dyn SpeechSynthesizer>);
        let recognizer = config
            .listen_command
            .clone()
            .and_then(CommandRecognizer::new)
            .map(|r| Arc::new(r) as Arc<dyn SpeechRecognizer>);
        Self { synthesizer, recognizer, speak_answers: config.speak_answers }
    }

    pub fn can_listen(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn can_speak(&self) -> bool {
        self.synthesizer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_commands_mean_absent_capability() {
        let voice = Voice::from_config(&VoiceConfig {
            speak_command: Some(vec![]),
            listen_command: None,
            speak_answers: true,
        });
        assert!(!voice.can_speak());
        assert!(!voice.can_listen());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn recognizer_reads_stdout() {
        let recognizer = CommandRecognizer::new(vec!["echo".into(), "  ¿horario?  ".into()]).unwrap();
        assert_eq!(recognizer.listen().await.unwrap(), Some("¿horario?".into()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_synthesizer_is_an_error() {
        let synthesizer = CommandSynthesizer::new(vec!["false".into()]).unwrap();
        assert!(synthesizer.speak("hola").await.is_err());
        let missing = CommandSynthesizer::new(vec!["/nonexistent/tts-binary".into()]).unwrap();
        assert!(missing.speak("hola").await.is_err());
    }
}
