//! Audio duration measurement.
//!
//! Synthesis providers return one opaque audio blob per request; the
//! pipeline needs its playable duration to back-allocate per-verse timing.
//! The probe is a collaborator that can fail or time out, in which case
//! callers fall back to [`estimate_duration_seconds`].

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

use crate::error::{Result, TtsError};

/// Measures the playable duration of encoded audio, in seconds.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    async fn probe(&self, audio: &[u8]) -> Result<f64>;
}

/// Deterministic fallback estimate for when no probe result is available.
pub fn estimate_duration_seconds(byte_len: usize, bytes_per_second: u64) -> f64 {
    if bytes_per_second == 0 {
        return 0.0;
    }
    byte_len as f64 / bytes_per_second as f64
}

/// Probes duration by writing the audio to a temporary file and asking ffprobe.
pub struct FfprobeDurationProbe {
    ffprobe_path: PathBuf,
}

impl FfprobeDurationProbe {
    /// Create a probe, locating ffprobe in PATH when no path is given.
    pub fn new(ffprobe_path: Option<PathBuf>) -> Result<Self> {
        let ffprobe_path = match ffprobe_path {
            Some(path) => {
                if !path.exists() {
                    return Err(TtsError::ProbeFailed(format!(
                        "ffprobe not found at specified path: {}",
                        path.display()
                    )));
                }
                path
            }
            None => which::which("ffprobe")
                .map_err(|_| TtsError::ProbeFailed("ffprobe not found in PATH".into()))?,
        };

        Ok(Self { ffprobe_path })
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    async fn probe(&self, audio: &[u8]) -> Result<f64> {
        let temp_dir = tempfile::tempdir()?;
        let input_path = temp_dir.path().join("probe-input");
        tokio::fs::write(&input_path, audio).await?;

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(&input_path)
            .output()
            .await
            .map_err(|e| TtsError::ProbeFailed(format!("failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TtsError::ProbeFailed(format!("ffprobe failed: {}", stderr)));
        }

        let duration_str = String::from_utf8_lossy(&output.stdout);
        duration_str.trim().parse::<f64>().map_err(|e| {
            TtsError::ProbeFailed(format!(
                "unparseable duration {:?}: {}",
                duration_str.trim(),
                e
            ))
        })
    }
}

/// Reports duration proportional to byte length at a fixed rate.
///
/// Deterministic, so pipeline tests can predict every allocated duration.
pub struct FixedRateProbe {
    bytes_per_second: f64,
}

impl FixedRateProbe {
    pub fn new(bytes_per_second: f64) -> Self {
        Self { bytes_per_second }
    }
}

#[async_trait]
impl DurationProbe for FixedRateProbe {
    async fn probe(&self, audio: &[u8]) -> Result<f64> {
        if self.bytes_per_second <= 0.0 {
            return Err(TtsError::ProbeFailed(
                "fixed-rate probe needs a positive rate".into(),
            ));
        }
        Ok(audio.len() as f64 / self.bytes_per_second)
    }
}
