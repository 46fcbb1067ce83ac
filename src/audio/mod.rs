pub mod data_uri;
pub mod format;
pub mod wav;

pub use data_uri::{extract_pcm, from_data_uri, to_data_uri, wav_data_uri_from_payload, WAV_DATA_URI_PREFIX};
pub use format::AudioFormat;
pub use wav::{decode, encode, encode_raw, write_wav, WavHeader, WavStreamWriter, HEADER_LEN};
