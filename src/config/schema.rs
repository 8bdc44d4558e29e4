use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_FILES: usize = 3;
pub const DEFAULT_MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Top-level config file (`config.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub upload: UploadConfig,
    pub voice: VoiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL hosting `/chat`, `/upload` and `/history`.
    pub base_url: String,
    /// Per-request timeout. Requests are never retried.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".into(),
            timeout_secs: 60,
        }
    }
}

/// Multipart field layout expected by the upload endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldMode {
    /// Every eligible file as a part named `files`.
    #[default]
    Multi,
    /// Only the first eligible file, as a part named `file`.
    Single,
}

impl FieldMode {
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Multi => "files",
            Self::Single => "file",
        }
    }
}

/// How the cosmetic upload progress bar advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStrategy {
    /// +10% per tick, capped at 90%.
    Fixed,
    /// Random increments capped at 85%, with rotating captions.
    #[default]
    Staged,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct UploadConfig {
    pub max_files: usize,
    /// Bytes. Files strictly larger than this are ineligible.
    pub max_file_size: u64,
    /// Lower-case extensions without the dot.
    pub allowed_extensions: Vec<String>,
    pub field_mode: FieldMode,
    pub progress: ProgressStrategy,
    /// How long the 100% state stays visible before the result is shown.
    pub result_delay_ms: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: vec!["pdf".into(), "txt".into(), "docx".into()],
            field_mode: FieldMode::default(),
            progress: ProgressStrategy::default(),
            result_delay_ms: 500,
        }
    }
}

/// External speech programs. An absent command means the capability is
/// unavailable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VoiceConfig {
    /// argv of a text-to-speech program; the text is appended as the last arg.
    pub speak_command: Option<Vec<String>>,
    /// argv of a speech-to-text program; the transcript is read from stdout.
    pub listen_command: Option<Vec<String>>,
    /// Speak every answer after it is rendered.
    pub speak_answers: bool,
}
