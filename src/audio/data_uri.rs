use base64::alphabet;
use base64::engine::{general_purpose, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

use super::format::AudioFormat;
use super::wav;
use crate::error::PayloadError;

/// Scheme prefix of a playable WAV data URI
pub const WAV_DATA_URI_PREFIX: &str = "data:audio/wav;base64,";

/// Standard alphabet, padding optional, non-zero trailing bits tolerated
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode base64 that may be wrapped across lines or lack padding
fn decode_lenient(encoded: &str) -> Result<Vec<u8>, PayloadError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(LENIENT.decode(compact)?)
}

/// Decode the PCM carried by a TTS payload.
///
/// Anything up to and including the first comma (a `data:<mime>;base64,`
/// prefix) is dropped; a payload without a comma is taken as bare base64.
/// Line breaks and other ASCII whitespace are ignored and padding is optional.
pub fn extract_pcm(payload: &str) -> Result<Vec<u8>, PayloadError> {
    let encoded = match payload.find(',') {
        Some(idx) => &payload[idx + 1..],
        None => payload,
    };

    decode_lenient(encoded)
}

/// Base64-encode a WAV stream as a `data:audio/wav;base64,` URI
pub fn to_data_uri(wav: &[u8]) -> String {
    let mut uri = String::with_capacity(WAV_DATA_URI_PREFIX.len() + wav.len().div_ceil(3) * 4);
    uri.push_str(WAV_DATA_URI_PREFIX);
    general_purpose::STANDARD.encode_string(wav, &mut uri);
    uri
}

/// Decode the WAV stream held by a `data:audio/wav;base64,` URI
pub fn from_data_uri(uri: &str) -> Result<Vec<u8>, PayloadError> {
    let encoded = uri
        .strip_prefix(WAV_DATA_URI_PREFIX)
        .ok_or(PayloadError::NotWavDataUri)?;
    decode_lenient(encoded)
}

/// Turn a TTS payload straight into a playable WAV data URI
pub fn wav_data_uri_from_payload(payload: &str, format: AudioFormat) -> Result<String, PayloadError> {
    let pcm = extract_pcm(payload)?;
    let wav = wav::encode(&pcm, format)?;
    Ok(to_data_uri(&wav))
}
