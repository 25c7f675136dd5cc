//! versecast configuration management.

use crate::segmenter::{DEFAULT_CHARS_PER_MINUTE, SegmentationConfig};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tts_client::TtsSettings;

// Minute targets the character thresholds derive from
const DEFAULT_MIN_MINUTES: u32 = 12;
const DEFAULT_TARGET_MINUTES: u32 = 18;
const DEFAULT_MAX_MINUTES: u32 = 22;
const DEFAULT_MIN_MERGE_MINUTES: u32 = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersecastConfig {
    /// Default corpus JSON path
    #[serde(default)]
    pub corpus: Option<PathBuf>,

    /// Narration rate in characters per minute
    #[serde(default = "default_chars_per_minute")]
    pub chars_per_minute: usize,

    /// Minimum standalone episode length in minutes
    #[serde(default = "default_min_minutes")]
    pub min_episode_minutes: u32,

    /// Ideal episode length in minutes
    #[serde(default = "default_target_minutes")]
    pub target_episode_minutes: u32,

    /// Hard episode ceiling in minutes
    #[serde(default = "default_max_minutes")]
    pub max_episode_minutes: u32,

    /// Below this, a trailing remainder merges into a neighbor
    #[serde(default = "default_min_merge_minutes")]
    pub min_merge_minutes: u32,

    /// Courtesy delay between synthesis requests, in seconds
    #[serde(default = "default_inter_chunk_delay")]
    pub inter_chunk_delay_secs: u64,

    /// How long to wait for the duration probe, in seconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Byte rate assumed when estimating duration without a probe
    #[serde(default = "default_assumed_bytes_per_second")]
    pub assumed_bytes_per_second: u64,

    /// Overrides the provider's per-request character ceiling when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chars_per_chunk: Option<usize>,

    /// TTS provider settings
    #[serde(default)]
    pub tts: TtsSettings,
}

fn default_chars_per_minute() -> usize {
    DEFAULT_CHARS_PER_MINUTE
}

fn default_min_minutes() -> u32 {
    DEFAULT_MIN_MINUTES
}

fn default_target_minutes() -> u32 {
    DEFAULT_TARGET_MINUTES
}

fn default_max_minutes() -> u32 {
    DEFAULT_MAX_MINUTES
}

fn default_min_merge_minutes() -> u32 {
    DEFAULT_MIN_MERGE_MINUTES
}

fn default_inter_chunk_delay() -> u64 {
    3
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_assumed_bytes_per_second() -> u64 {
    16_000
}

impl Default for VersecastConfig {
    fn default() -> Self {
        Self {
            corpus: None,
            chars_per_minute: default_chars_per_minute(),
            min_episode_minutes: default_min_minutes(),
            target_episode_minutes: default_target_minutes(),
            max_episode_minutes: default_max_minutes(),
            min_merge_minutes: default_min_merge_minutes(),
            inter_chunk_delay_secs: default_inter_chunk_delay(),
            probe_timeout_secs: default_probe_timeout(),
            assumed_bytes_per_second: default_assumed_bytes_per_second(),
            max_chars_per_chunk: None,
            tts: TtsSettings::default(),
        }
    }
}

impl VersecastConfig {
    /// Get the config file path: ~/.config/cli-programs/versecast.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("versecast.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: VersecastConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Segmentation thresholds derived from the configured minute targets.
    pub fn segmentation(&self) -> SegmentationConfig {
        SegmentationConfig::from_minutes(
            self.chars_per_minute,
            self.min_episode_minutes,
            self.target_episode_minutes,
            self.max_episode_minutes,
            self.min_merge_minutes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VersecastConfig::default();
        assert_eq!(config.chars_per_minute, 910);
        assert_eq!(config.min_episode_minutes, 12);
        assert_eq!(config.max_episode_minutes, 22);
        assert_eq!(config.inter_chunk_delay_secs, 3);
        assert!(config.corpus.is_none());
        assert!(config.segmentation().validate().is_ok());
    }

    #[test]
    fn test_config_path() {
        let path = VersecastConfig::config_path().unwrap();
        assert!(path.ends_with("cli-programs/versecast.toml"));
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
corpus = "/data/corpus.json"
chars_per_minute = 800
min_episode_minutes = 10

[tts]
provider = "command"
voice = "ko-KR-SunHiNeural"
"#;
        let config: VersecastConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.corpus, Some(PathBuf::from("/data/corpus.json")));
        assert_eq!(config.chars_per_minute, 800);
        assert_eq!(config.min_episode_minutes, 10);
        // untouched fields keep defaults
        assert_eq!(config.target_episode_minutes, 18);
        assert_eq!(config.tts.provider, "command");
        assert_eq!(config.tts.voice.as_deref(), Some("ko-KR-SunHiNeural"));
        assert_eq!(config.segmentation().min_episode_chars, 8000);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: VersecastConfig = toml::from_str("").unwrap();
        assert_eq!(config.chars_per_minute, 910);
        assert_eq!(config.tts.provider, "http");
    }
}
