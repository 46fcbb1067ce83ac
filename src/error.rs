use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("WAV error: {0}")]
    Wav(#[from] WavError),

    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// WAV container errors
#[derive(Error, Debug)]
pub enum WavError {
    #[error("Invalid audio format: {0}")]
    InvalidFormat(String),

    #[error("WAV encoding failed: {0}")]
    EncodingFailure(#[from] std::io::Error),

    #[error("Malformed WAV data: {0}")]
    Malformed(String),

    #[error("Unsupported WAV format tag: {0}")]
    UnsupportedFormat(u16),

    #[error("Data length mismatch: declared {expected} bytes, got {written}")]
    LengthMismatch { expected: u64, written: u64 },
}

/// TTS payload decoding errors
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Invalid base64 audio: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Not a data:audio/wav;base64 URI")]
    NotWavDataUri,

    #[error(transparent)]
    Wav(#[from] WavError),
}

/// Summarizer and speech synthesizer errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("`{0}` timed out after {1}s")]
    Timeout(String, u64),

    #[error("Invalid provider output: {0}")]
    InvalidOutput(String),

    #[error("Provider IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Audio summary pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Page content is empty")]
    EmptyContent,

    #[error("Failed to generate a valid summary")]
    EmptySummary,

    #[error("Failed to generate audio")]
    EmptyAudio,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

pub type Result<T> = std::result::Result<T, AppError>;
