//! Mock TTS provider for testing
//!
//! Provides a configurable mock that can simulate failures and returns
//! dummy audio whose byte length is proportional to the input text, so
//! duration arithmetic stays predictable in tests.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::DEFAULT_MAX_CHARS_PER_REQUEST;
use crate::error::{Result, TtsError};
use crate::provider::TtsProvider;

/// Dummy audio bytes emitted per input character.
const DEFAULT_BYTES_PER_CHAR: usize = 100;

/// A mock provider for testing failure and pacing behavior
pub struct MockTtsProvider {
    /// Number of times to fail before succeeding (0 = always succeed)
    fail_count: AtomicUsize,
    /// Current call count
    call_count: AtomicUsize,
    /// Error to return on failure (None = always succeed)
    fail_with: Mutex<Option<TtsError>>,
    /// Texts passed to synthesize, in call order
    texts: Mutex<Vec<String>>,
    /// Dummy audio bytes per input character
    bytes_per_char: usize,
    /// Per-request character ceiling
    max_chars: usize,
}

impl MockTtsProvider {
    /// Create a provider that always succeeds
    pub fn always_succeeds() -> Self {
        Self {
            fail_count: AtomicUsize::new(0),
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(None),
            texts: Mutex::new(Vec::new()),
            bytes_per_char: DEFAULT_BYTES_PER_CHAR,
            max_chars: DEFAULT_MAX_CHARS_PER_REQUEST,
        }
    }

    /// Create a provider that fails `n` times with the given error, then succeeds
    pub fn fails_then_succeeds(n: usize, error: TtsError) -> Self {
        Self {
            fail_count: AtomicUsize::new(n),
            fail_with: Mutex::new(Some(error)),
            ..Self::always_succeeds()
        }
    }

    /// Create a provider that always fails with the given error
    pub fn always_fails(error: TtsError) -> Self {
        Self {
            fail_count: AtomicUsize::new(usize::MAX),
            fail_with: Mutex::new(Some(error)),
            ..Self::always_succeeds()
        }
    }

    /// Set the per-request character ceiling
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Set the dummy audio size per character
    pub fn with_bytes_per_char(mut self, bytes_per_char: usize) -> Self {
        self.bytes_per_char = bytes_per_char;
        self
    }

    /// Get the number of times synthesize() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get the texts synthesized so far, in call order
    pub fn synthesized_texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TtsProvider for MockTtsProvider {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);
        let fail_count = self.fail_count.load(Ordering::SeqCst);

        if call_num < fail_count {
            let error = self.fail_with.lock().unwrap();
            if let Some(err) = error.as_ref() {
                return Err(clone_error(err));
            }
        }

        self.texts.lock().unwrap().push(text.to_string());
        Ok(vec![0u8; text.chars().count() * self.bytes_per_char])
    }

    fn max_chars_per_request(&self) -> usize {
        self.max_chars
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_available(&self) -> Result<()> {
        Ok(())
    }
}

/// Clone a TtsError (needed because TtsError doesn't implement Clone)
fn clone_error(err: &TtsError) -> TtsError {
    match err {
        TtsError::SynthesisFailed { provider, message } => TtsError::SynthesisFailed {
            provider: provider.clone(),
            message: message.clone(),
        },
        TtsError::RateLimited { retry_after } => TtsError::RateLimited {
            retry_after: *retry_after,
        },
        TtsError::Timeout { seconds } => TtsError::Timeout { seconds: *seconds },
        TtsError::ProbeFailed(s) => TtsError::ProbeFailed(s.clone()),
        TtsError::ProviderUnavailable(s) => TtsError::ProviderUnavailable(s.clone()),
        TtsError::ConfigError(s) => TtsError::ConfigError(s.clone()),
        // IO errors can't be cloned; degrade to a generic message
        TtsError::Io(_) => TtsError::ConfigError("IO error (mock)".to_string()),
    }
}
