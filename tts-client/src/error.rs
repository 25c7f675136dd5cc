use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtsError {
    #[error("Synthesis failed ({provider}): {message}")]
    SynthesisFailed { provider: String, message: String },

    #[error("Rate limit exceeded{}", .retry_after.map(|s| format!(". Retry after {} seconds", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    #[error("Provider timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Duration probe failed: {0}")]
    ProbeFailed(String),

    #[error("Provider not available: {0}")]
    ProviderUnavailable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TtsError>;
