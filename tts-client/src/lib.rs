//! Shared TTS client library for the versecast workspace
//!
//! Provides a unified interface over text-to-speech collaborators:
//! - HTTP synthesis endpoints (JSON in, audio bytes out)
//! - External CLI tools (edge-tts compatible)
//! - A mock provider for tests
//!
//! Alongside synthesis it carries the two helpers the pipeline needs to
//! time-align output audio: a duration probe (ffprobe, with a byte-rate
//! fallback estimate) and an injectable inter-request pacer.

pub mod config;
pub mod error;
pub mod pacer;
pub mod probe;
pub mod provider;
pub mod providers;

pub use config::TtsSettings;
pub use error::{Result, TtsError};
pub use pacer::{FixedIntervalPacer, NoPacer, Pacer};
pub use probe::{DurationProbe, FfprobeDurationProbe, FixedRateProbe, estimate_duration_seconds};
pub use provider::TtsProvider;
pub use providers::{MockTtsProvider, ProviderKind, get_provider};
