mod schema;

pub use schema::*;

use crate::audio::AudioFormat;
use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Get the configuration directory path
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vox-summarizer")
}

/// Get the default configuration file path
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load configuration from `path` (or the default location), falling back to defaults
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(config_path);

    let config = if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        let content = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        toml::from_str::<AppConfig>(&content).map_err(ConfigError::ParseError)?
    } else if path.is_some() {
        return Err(ConfigError::ValidationError(format!(
            "config file {:?} does not exist",
            config_path
        ))
        .into());
    } else {
        info!("No configuration file found, using defaults");
        AppConfig::default()
    };

    config.validate()?;
    Ok(config)
}

/// Save configuration to `path`, creating parent directories
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(ConfigError::ReadError)?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::ValidationError(e.to_string()))?;
    std::fs::write(path, content).map_err(ConfigError::ReadError)?;

    info!("Configuration saved to {:?}", path);
    Ok(())
}

impl AppConfig {
    /// Check values that serde cannot
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.general.max_content_chars == 0 {
            return Err(ConfigError::ValidationError(
                "general.max_content_chars must be greater than 0".into(),
            ));
        }

        self.audio_format()
            .map_err(|e| ConfigError::ValidationError(format!("audio: {}", e)))?;

        Ok(())
    }

    /// PCM format of synthesized speech
    pub fn audio_format(&self) -> std::result::Result<AudioFormat, crate::error::WavError> {
        AudioFormat::new(
            self.audio.channels,
            self.audio.sample_rate,
            self.audio.bits_per_sample,
        )
    }
}
