//! TTS provider implementations

mod command;
mod http;
pub mod mock;

pub use command::CommandTtsProvider;
pub use http::HttpTtsProvider;
pub use mock::MockTtsProvider;

use crate::config::TtsSettings;
use crate::error::{Result, TtsError};
use crate::provider::TtsProvider;

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Http,
    Command,
    Mock,
}

impl ProviderKind {
    /// Parse provider kind from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "command" | "cli" => Ok(Self::Command),
            "mock" => Ok(Self::Mock),
            _ => Err(TtsError::ConfigError(format!("Unknown provider: {}", s))),
        }
    }
}

/// Create a provider instance from settings
pub fn get_provider(settings: &TtsSettings) -> Result<Box<dyn TtsProvider>> {
    let kind = ProviderKind::from_str(&settings.provider)?;

    match kind {
        ProviderKind::Http => {
            let endpoint = settings.endpoint.clone().ok_or_else(|| {
                TtsError::ConfigError("http provider requires an endpoint".into())
            })?;
            let api_key = settings
                .api_key
                .clone()
                .or_else(|| std::env::var("TTS_API_KEY").ok());
            Ok(Box::new(HttpTtsProvider::new(
                &endpoint,
                api_key,
                settings.voice.clone(),
                settings.max_chars_per_request,
            )))
        }
        ProviderKind::Command => Ok(Box::new(CommandTtsProvider::new(
            settings.command_path.clone(),
            settings.voice.clone(),
            settings.max_chars_per_request,
        )?)),
        ProviderKind::Mock => Ok(Box::new(
            MockTtsProvider::always_succeeds().with_max_chars(settings.max_chars_per_request),
        )),
    }
}
