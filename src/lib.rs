pub mod audio;
pub mod config;
pub mod error;
pub mod summary;

pub use audio::AudioFormat;
pub use config::AppConfig;
pub use error::{AppError, Result};
pub use summary::{AudioSummary, Pipeline};
