use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::audio::AudioFormat;
use crate::error::ProviderError;

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// A spoken summary ready for playback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSummary {
    /// The summarized page content
    pub summary: String,
    /// `data:audio/wav;base64,` URI of the spoken summary
    pub audio_data_uri: String,
}

/// Text summarization provider
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Returns the provider name for logging/display
    fn name(&self) -> &str;

    /// Summarize page text
    async fn summarize(&self, text: &str) -> ProviderResult<String>;
}

/// Text-to-speech provider
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns the provider name for logging/display
    fn name(&self) -> &str;

    /// Speak `text`, returning base64 PCM with an optional `scheme,` prefix
    async fn synthesize(&self, text: &str) -> ProviderResult<String>;

    /// Format of the PCM carried by [`synthesize`](Self::synthesize) payloads
    fn format(&self) -> AudioFormat {
        AudioFormat::tts_default()
    }
}
