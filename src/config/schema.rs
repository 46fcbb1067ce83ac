use serde::{Deserialize, Serialize};

use crate::audio::AudioFormat;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub audio: AudioConfig,
    pub providers: ProvidersConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Page text beyond this many characters is dropped before summarizing
    pub max_content_chars: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_content_chars: 15_000,
        }
    }
}

/// PCM format of the audio returned by the TTS provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        let format = AudioFormat::tts_default();
        Self {
            channels: format.channel_count,
            sample_rate: format.sample_rate_hz,
            bits_per_sample: format.bits_per_sample,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub summarizer: CommandConfig,
    pub tts: CommandConfig,
}

/// External program used as a provider.
///
/// The text is written to its stdin; stdout is the result. For TTS the result
/// is base64 PCM, optionally behind a `data:<mime>;base64,` prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Program followed by its arguments (empty = not configured)
    pub command: Vec<String>,
    /// Kill the program after this many seconds
    pub timeout_secs: u64,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
