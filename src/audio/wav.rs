use std::io::Write;

use tracing::debug;

use super::format::AudioFormat;
use crate::error::WavError;

/// Size of the canonical RIFF/WAVE header written by [`encode`]
pub const HEADER_LEN: usize = 44;

/// `fmt ` chunk size for plain PCM
const FMT_CHUNK_LEN: u32 = 16;

/// WAVE_FORMAT_PCM
const FORMAT_PCM: u16 = 1;

/// Wrap raw PCM bytes in a WAV container.
///
/// The data chunk holds `pcm` unmodified. Lengths are stored as `u32` and wrap
/// past 4 GiB; callers must stay below that.
pub fn encode(pcm: &[u8], format: AudioFormat) -> Result<Vec<u8>, WavError> {
    let mut buf = Vec::with_capacity(HEADER_LEN + pcm.len());
    write_wav(&mut buf, pcm, format)?;

    debug!("Encoded {} bytes of PCM ({}) as WAV", pcm.len(), format);
    Ok(buf)
}

/// [`encode`] for callers holding unvalidated format fields
pub fn encode_raw(
    pcm: &[u8],
    channel_count: u16,
    sample_rate_hz: u32,
    bits_per_sample: u16,
) -> Result<Vec<u8>, WavError> {
    let format = AudioFormat::new(channel_count, sample_rate_hz, bits_per_sample)?;
    encode(pcm, format)
}

/// Write a complete WAV file to `writer`
pub fn write_wav<W: Write>(writer: &mut W, pcm: &[u8], format: AudioFormat) -> Result<(), WavError> {
    format.validate()?;
    write_header(writer, format, pcm.len() as u32)?;
    writer.write_all(pcm)?;
    Ok(())
}

fn write_header<W: Write>(writer: &mut W, format: AudioFormat, data_len: u32) -> Result<(), WavError> {
    let mut header = [0u8; HEADER_LEN];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&36u32.wrapping_add(data_len).to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    header[20..22].copy_from_slice(&FORMAT_PCM.to_le_bytes());
    header[22..24].copy_from_slice(&format.channel_count.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate_hz.to_le_bytes());
    header[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&format.bits_per_sample.to_le_bytes());

    // data sub-chunk header
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_len.to_le_bytes());

    writer.write_all(&header)?;
    Ok(())
}

/// Fields of a canonical 44-byte WAV header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub format: AudioFormat,
    /// RIFF chunk size (file length minus 8)
    pub riff_len: u32,
    /// Declared byte rate
    pub byte_rate: u32,
    /// Declared block alignment
    pub block_align: u16,
    /// Length of the data chunk in bytes
    pub data_len: u32,
}

impl WavHeader {
    /// Parse the header written by [`encode`]
    pub fn parse(bytes: &[u8]) -> Result<Self, WavError> {
        if bytes.len() < HEADER_LEN {
            return Err(WavError::Malformed(format!(
                "expected at least {} header bytes, got {}",
                HEADER_LEN,
                bytes.len()
            )));
        }

        expect_tag(bytes, 0, b"RIFF")?;
        expect_tag(bytes, 8, b"WAVE")?;
        expect_tag(bytes, 12, b"fmt ")?;
        expect_tag(bytes, 36, b"data")?;

        let fmt_len = read_u32(bytes, 16);
        if fmt_len != FMT_CHUNK_LEN {
            return Err(WavError::Malformed(format!(
                "unexpected fmt chunk size {}",
                fmt_len
            )));
        }

        let format_tag = read_u16(bytes, 20);
        if format_tag != FORMAT_PCM {
            return Err(WavError::UnsupportedFormat(format_tag));
        }

        let format = AudioFormat::new(read_u16(bytes, 22), read_u32(bytes, 24), read_u16(bytes, 34))?;

        Ok(Self {
            format,
            riff_len: read_u32(bytes, 4),
            byte_rate: read_u32(bytes, 28),
            block_align: read_u16(bytes, 32),
            data_len: read_u32(bytes, 40),
        })
    }
}

/// Read back the format and PCM data of a WAV produced by [`encode`]
pub fn decode(bytes: &[u8]) -> Result<(AudioFormat, &[u8]), WavError> {
    let header = WavHeader::parse(bytes)?;
    let end = HEADER_LEN + header.data_len as usize;

    let data = bytes.get(HEADER_LEN..end).ok_or_else(|| {
        WavError::Malformed(format!(
            "data chunk declares {} bytes, only {} present",
            header.data_len,
            bytes.len() - HEADER_LEN
        ))
    })?;

    Ok((header.format, data))
}

fn expect_tag(bytes: &[u8], offset: usize, tag: &[u8; 4]) -> Result<(), WavError> {
    let found = &bytes[offset..offset + 4];
    if found != tag {
        return Err(WavError::Malformed(format!(
            "expected {:?} at offset {}, found {:?}",
            String::from_utf8_lossy(tag),
            offset,
            String::from_utf8_lossy(found)
        )));
    }
    Ok(())
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Writes a WAV whose total data length is known up front, taking the PCM in
/// pieces.
pub struct WavStreamWriter<W: Write> {
    writer: W,
    expected: u32,
    written: u64,
}

impl<W: Write> WavStreamWriter<W> {
    /// Validate `format` and write the header for `data_len` bytes of PCM
    pub fn new(mut writer: W, format: AudioFormat, data_len: u32) -> Result<Self, WavError> {
        format.validate()?;
        write_header(&mut writer, format, data_len)?;

        Ok(Self {
            writer,
            expected: data_len,
            written: 0,
        })
    }

    /// Append a piece of PCM data
    pub fn write_pcm(&mut self, pcm: &[u8]) -> Result<(), WavError> {
        let total = self.written + pcm.len() as u64;
        if total > self.expected as u64 {
            return Err(WavError::LengthMismatch {
                expected: self.expected as u64,
                written: total,
            });
        }

        self.writer.write_all(pcm)?;
        self.written = total;
        Ok(())
    }

    /// Bytes of PCM still expected
    pub fn remaining(&self) -> u64 {
        self.expected as u64 - self.written
    }

    /// Flush and return the inner writer once all declared data is written
    pub fn finish(mut self) -> Result<W, WavError> {
        if self.written != self.expected as u64 {
            return Err(WavError::LengthMismatch {
                expected: self.expected as u64,
                written: self.written,
            });
        }

        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    fn mono_24k() -> AudioFormat {
        AudioFormat::tts_default()
    }

    fn field_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn field_u16(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    #[test]
    fn encodes_four_byte_example() {
        let pcm = [0x00, 0x01, 0x02, 0x03];
        let wav = encode(&pcm, mono_24k()).unwrap();

        assert_eq!(wav.len(), 48);
        assert_eq!(field_u32(&wav, 24), 24_000);
        assert_eq!(&wav[44..], &pcm);
    }

    #[test]
    fn header_tags_and_sizes() {
        let pcm: Vec<u8> = (0..=255u8).cycle().take(1_000).collect();
        let wav = encode(&pcm, mono_24k()).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(wav.len(), HEADER_LEN + pcm.len());
        assert_eq!(field_u32(&wav, 4), 36 + pcm.len() as u32);
        assert_eq!(field_u32(&wav, 16), 16);
        assert_eq!(field_u16(&wav, 20), 1);
        assert_eq!(field_u32(&wav, 40), pcm.len() as u32);
    }

    #[test]
    fn byte_rate_and_block_align() {
        for (channels, rate, bits) in [(1, 24_000, 16), (2, 44_100, 16), (2, 48_000, 24), (4, 96_000, 32), (1, 8_000, 8)] {
            let format = AudioFormat::new(channels, rate, bits).unwrap();
            let wav = encode(&[], format).unwrap();
            let bytes = bits as u32 / 8;

            assert_eq!(field_u16(&wav, 22), channels);
            assert_eq!(field_u32(&wav, 28), rate * channels as u32 * bytes);
            assert_eq!(field_u16(&wav, 32) as u32, channels as u32 * bytes);
            assert_eq!(field_u16(&wav, 34), bits);
        }
    }

    #[test]
    fn empty_pcm_is_header_only() {
        let wav = encode(&[], mono_24k()).unwrap();
        assert_eq!(wav.len(), HEADER_LEN);
        assert_eq!(field_u32(&wav, 4), 36);
        assert_eq!(field_u32(&wav, 40), 0);
    }

    #[test]
    fn output_is_deterministic() {
        let pcm = vec![7u8; 480];
        assert_eq!(encode(&pcm, mono_24k()).unwrap(), encode(&pcm, mono_24k()).unwrap());
    }

    #[test]
    fn zero_channels_is_invalid() {
        let format = AudioFormat {
            channel_count: 0,
            sample_rate_hz: 24_000,
            bits_per_sample: 16,
        };
        assert!(matches!(encode(&[0, 1, 2, 3], format), Err(WavError::InvalidFormat(_))));
        assert!(matches!(encode_raw(&[0, 1], 0, 24_000, 16), Err(WavError::InvalidFormat(_))));
        assert!(matches!(encode_raw(&[0, 1], 1, 24_000, 12), Err(WavError::InvalidFormat(_))));
    }

    #[test]
    fn data_is_not_realigned() {
        // 3 bytes is not a whole 16-bit frame; the encoder copies it as is
        let wav = encode(&[1, 2, 3], mono_24k()).unwrap();
        assert_eq!(field_u32(&wav, 40), 3);
        assert_eq!(&wav[44..], &[1u8, 2, 3]);
    }

    #[test]
    fn round_trip_through_decode() {
        let format = AudioFormat::new(2, 22_050, 24).unwrap();
        let pcm: Vec<u8> = (0..60u8).collect();
        let wav = encode(&pcm, format).unwrap();

        let (decoded, data) = decode(&wav).unwrap();
        assert_eq!(decoded, format);
        assert_eq!(data, pcm.as_slice());

        let header = WavHeader::parse(&wav).unwrap();
        assert_eq!(header.riff_len, 36 + 60);
        assert_eq!(header.byte_rate, format.byte_rate());
        assert_eq!(header.block_align, format.block_align());
    }

    #[test]
    fn round_trip_through_hound() {
        let samples: Vec<i16> = vec![0, 1, -1, i16::MAX, i16::MIN, 1234, -4321, 42];
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let format = AudioFormat::new(2, 16_000, 16).unwrap();
        let wav = encode(&pcm, format).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);

        let read: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(read, samples);
    }

    #[test]
    fn decode_rejects_bad_input() {
        assert!(matches!(decode(b"RIFF"), Err(WavError::Malformed(_))));

        let mut wav = encode(&[0; 8], mono_24k()).unwrap();
        wav[8..12].copy_from_slice(b"AVI ");
        assert!(matches!(decode(&wav), Err(WavError::Malformed(_))));

        let mut wav = encode(&[0; 8], mono_24k()).unwrap();
        wav[20..22].copy_from_slice(&3u16.to_le_bytes());
        assert!(matches!(decode(&wav), Err(WavError::UnsupportedFormat(3))));

        let wav = encode(&[0; 8], mono_24k()).unwrap();
        assert!(matches!(decode(&wav[..48]), Err(WavError::Malformed(_))));
    }

    #[test]
    fn stream_writer_matches_encode() {
        let pcm: Vec<u8> = (0..100u8).collect();
        let mut writer = WavStreamWriter::new(Vec::new(), mono_24k(), pcm.len() as u32).unwrap();
        for piece in pcm.chunks(7) {
            writer.write_pcm(piece).unwrap();
        }
        assert_eq!(writer.remaining(), 0);

        let streamed = writer.finish().unwrap();
        assert_eq!(streamed, encode(&pcm, mono_24k()).unwrap());
    }

    #[test]
    fn stream_writer_enforces_declared_length() {
        let mut writer = WavStreamWriter::new(Vec::new(), mono_24k(), 4).unwrap();
        writer.write_pcm(&[1, 2]).unwrap();
        assert!(matches!(
            writer.write_pcm(&[3, 4, 5]),
            Err(WavError::LengthMismatch { expected: 4, written: 5 })
        ));
        assert!(matches!(
            writer.finish(),
            Err(WavError::LengthMismatch { expected: 4, written: 2 })
        ));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn io_failure_is_encoding_failure() {
        let result = write_wav(&mut FailingWriter, &[0, 0], mono_24k());
        assert!(matches!(result, Err(WavError::EncodingFailure(_))));
    }
}
