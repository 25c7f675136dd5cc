//! External-command synthesis provider
//!
//! Shells out to an edge-tts-compatible CLI: text and voice go in as
//! arguments, the tool writes an audio file which is read back.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

use crate::error::{Result, TtsError};
use crate::provider::TtsProvider;

const DEFAULT_COMMAND: &str = "edge-tts";
const SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(120);

/// Provider that uses an external TTS binary (subprocess)
pub struct CommandTtsProvider {
    binary: PathBuf,
    voice: Option<String>,
    max_chars: usize,
}

impl CommandTtsProvider {
    /// Create a new command provider
    ///
    /// Returns an error if the binary cannot be found.
    pub fn new(binary: Option<PathBuf>, voice: Option<String>, max_chars: usize) -> Result<Self> {
        let binary = match binary {
            Some(path) => {
                if path.exists() {
                    path
                } else {
                    // A bare name may still resolve through PATH
                    which::which(&path).map_err(|_| {
                        TtsError::ProviderUnavailable(format!(
                            "TTS command not found: {}",
                            path.display()
                        ))
                    })?
                }
            }
            None => which::which(DEFAULT_COMMAND).map_err(|_| {
                TtsError::ProviderUnavailable(format!(
                    "{} not found in PATH; set command_path in config",
                    DEFAULT_COMMAND
                ))
            })?,
        };

        Ok(Self {
            binary,
            voice,
            max_chars,
        })
    }
}

#[async_trait]
impl TtsProvider for CommandTtsProvider {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let temp_dir = tempfile::tempdir()?;
        let output_path = temp_dir.path().join("synthesis.mp3");

        let mut cmd = Command::new(&self.binary);
        if let Some(voice) = &self.voice {
            cmd.args(["--voice", voice]);
        }
        cmd.arg("--text").arg(text);
        cmd.arg("--write-media").arg(&output_path);

        let output = tokio::time::timeout(SYNTHESIS_TIMEOUT, cmd.output())
            .await
            .map_err(|_| TtsError::Timeout {
                seconds: SYNTHESIS_TIMEOUT.as_secs(),
            })?
            .map_err(|e| TtsError::SynthesisFailed {
                provider: "command".into(),
                message: format!("failed to execute: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TtsError::SynthesisFailed {
                provider: "command".into(),
                message: format!("command failed: {}", stderr),
            });
        }

        let audio = tokio::fs::read(&output_path).await.map_err(|e| {
            TtsError::SynthesisFailed {
                provider: "command".into(),
                message: format!("no output audio: {}", e),
            }
        })?;

        if audio.is_empty() {
            return Err(TtsError::SynthesisFailed {
                provider: "command".into(),
                message: "command produced an empty audio file".into(),
            });
        }

        Ok(audio)
    }

    fn max_chars_per_request(&self) -> usize {
        self.max_chars
    }

    fn name(&self) -> &'static str {
        "command"
    }

    fn is_available(&self) -> Result<()> {
        if !self.binary.exists() {
            return Err(TtsError::ProviderUnavailable(format!(
                "TTS command not found: {}",
                self.binary.display()
            )));
        }
        Ok(())
    }
}
