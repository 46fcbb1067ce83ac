pub mod command;
pub mod pipeline;
pub mod provider;

pub use command::{CommandSummarizer, CommandSynthesizer};
pub use pipeline::Pipeline;
pub use provider::{AudioSummary, ProviderResult, SpeechSynthesizer, Summarizer};

use crate::config::AppConfig;

/// Create the summarizer named by the configuration
pub fn create_summarizer(config: &AppConfig) -> ProviderResult<Box<dyn Summarizer>> {
    let provider = CommandSummarizer::new(&config.providers.summarizer)?;
    Ok(Box::new(provider))
}

/// Create the speech synthesizer named by the configuration
pub fn create_synthesizer(config: &AppConfig) -> ProviderResult<Box<dyn SpeechSynthesizer>> {
    let format = config
        .audio_format()
        .map_err(|e| crate::error::ProviderError::NotConfigured(format!("audio format: {}", e)))?;
    let provider = CommandSynthesizer::new(&config.providers.tts, format)?;
    Ok(Box::new(provider))
}

/// Build the audio summary pipeline from configuration
///
/// Both the summarizer and the TTS command must be configured.
pub fn create_pipeline(config: &AppConfig) -> ProviderResult<Pipeline> {
    let pipeline = Pipeline::new(create_summarizer(config)?, config.general.max_content_chars)
        .with_synthesizer(create_synthesizer(config)?);
    Ok(pipeline)
}
