use std::time::Duration;

use crate::error::WavError;

/// Sample layout of a raw PCM buffer.
///
/// Samples are interleaved and little-endian; 8-bit samples are unsigned,
/// wider ones signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// Number of interleaved channels
    pub channel_count: u16,
    /// Frames per second
    pub sample_rate_hz: u32,
    /// Bits per sample, a multiple of 8
    pub bits_per_sample: u16,
}

impl AudioFormat {
    /// Create a validated format
    pub fn new(
        channel_count: u16,
        sample_rate_hz: u32,
        bits_per_sample: u16,
    ) -> Result<Self, WavError> {
        let format = Self {
            channel_count,
            sample_rate_hz,
            bits_per_sample,
        };
        format.validate()?;
        Ok(format)
    }

    /// Format of the audio returned by the TTS provider: 16-bit mono at 24 kHz
    pub fn tts_default() -> Self {
        Self {
            channel_count: 1,
            sample_rate_hz: 24_000,
            bits_per_sample: 16,
        }
    }

    /// Check the field constraints of the WAV container
    pub fn validate(&self) -> Result<(), WavError> {
        if self.channel_count == 0 {
            return Err(WavError::InvalidFormat(
                "channel count must be at least 1".into(),
            ));
        }
        if self.sample_rate_hz == 0 {
            return Err(WavError::InvalidFormat(
                "sample rate must be at least 1 Hz".into(),
            ));
        }
        if self.bits_per_sample == 0 || self.bits_per_sample % 8 != 0 {
            return Err(WavError::InvalidFormat(format!(
                "bits per sample must be a positive multiple of 8, got {}",
                self.bits_per_sample
            )));
        }
        Ok(())
    }

    pub fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// Bytes per frame (one sample for every channel).
    ///
    /// Wraps at 2^16 like the 2-byte header field it fills, e.g. 8192 channels
    /// of 64-bit samples yield 0. [`validate`](Self::validate) does not reject
    /// such formats.
    pub fn block_align(&self) -> u16 {
        self.channel_count.wrapping_mul(self.bytes_per_sample())
    }

    /// Bytes per second of audio, wrapping at 2^32 like its header field
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate_hz
            .wrapping_mul(self.channel_count as u32)
            .wrapping_mul(self.bytes_per_sample() as u32)
    }

    /// Number of whole frames in a buffer of `len` bytes
    pub fn frame_count(&self, len: usize) -> usize {
        match self.block_align() as usize {
            0 => 0,
            align => len / align,
        }
    }

    /// Whether `len` bytes hold a whole number of frames
    pub fn is_frame_aligned(&self, len: usize) -> bool {
        match self.block_align() as usize {
            0 => len == 0,
            align => len % align == 0,
        }
    }

    /// Playback duration of `len` bytes of PCM in this format
    pub fn duration(&self, len: usize) -> Duration {
        if self.sample_rate_hz == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_count(len) as f64 / self.sample_rate_hz as f64)
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ch, {} Hz, {}-bit",
            self.channel_count, self.sample_rate_hz, self.bits_per_sample
        )
    }
}
