use async_trait::async_trait;

use crate::error::Result;

/// Trait for text-to-speech providers
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Synthesize one chunk of text into encoded audio bytes.
    ///
    /// A failure here is fatal for the episode being processed: callers
    /// must not keep partial output from earlier chunks.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;

    /// The provider's per-request character ceiling.
    ///
    /// Chunk planning must keep each request at or under this limit;
    /// observed provider limits range from about 1200 to 2000 characters.
    fn max_chars_per_request(&self) -> usize;

    /// Get the provider name for display
    fn name(&self) -> &'static str;

    /// Check if the provider is usable (endpoint configured, binary installed, etc.)
    fn is_available(&self) -> Result<()>;
}
