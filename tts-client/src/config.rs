use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default per-request character ceiling.
///
/// The most restrictive provider observed allows about 1200 characters per
/// call; individual providers can raise this via configuration.
pub const DEFAULT_MAX_CHARS_PER_REQUEST: usize = 1200;

/// Settings for constructing a TTS provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsSettings {
    /// Provider identifier (http, command, mock)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Synthesis endpoint URL (for the http provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// API key (optional, can use TTS_API_KEY env var instead)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Voice identifier passed through to the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,

    /// Path to a CLI binary (for the command provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_path: Option<PathBuf>,

    /// Per-request character ceiling for this provider
    #[serde(default = "default_max_chars")]
    pub max_chars_per_request: usize,
}

fn default_provider() -> String {
    "http".to_string()
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS_PER_REQUEST
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: None,
            api_key: None,
            voice: None,
            command_path: None,
            max_chars_per_request: default_max_chars(),
        }
    }
}
