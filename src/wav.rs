use crate::config::{Endianness, PcmFormat, SampleBits};
use crate::error::ConfigError;
use crate::pcm::encode_pcm_for;
use anyhow::{Context, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::path::Path;

pub const WAV_HEADER_LEN: usize = 44;

/// Largest payload whose RIFF size field (`36 + len`) still fits in a u32.
pub const MAX_PAYLOAD_LEN: usize = u32::MAX as usize - 36;

/// Wraps a PCM payload in the canonical 44-byte RIFF/WAVE header.
///
/// Every multi-byte header field is written in `endianness`, which must match
/// the byte order the payload was encoded with. Payloads longer than
/// `MAX_PAYLOAD_LEN` are rejected.
pub fn encode_wav(
    pcm: &[u8],
    sample_rate: u32,
    num_channels: u16,
    sample_bits: SampleBits,
    endianness: Endianness,
) -> Result<Vec<u8>, ConfigError> {
    let format = PcmFormat {
        sample_rate,
        num_channels,
        sample_bits,
        endianness,
    };
    encode_wav_for(pcm, &format)
}

pub fn encode_wav_for(pcm: &[u8], format: &PcmFormat) -> Result<Vec<u8>, ConfigError> {
    let data_len = payload_len(pcm.len())?;
    let mut out = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());
    out.resize(WAV_HEADER_LEN, 0);
    match format.endianness {
        Endianness::Little => write_header::<LittleEndian>(&mut out, data_len, format),
        Endianness::Big => write_header::<BigEndian>(&mut out, data_len, format),
    }
    out.extend_from_slice(pcm);
    Ok(out)
}

fn payload_len(len: usize) -> Result<u32, ConfigError> {
    if len > MAX_PAYLOAD_LEN {
        return Err(ConfigError::PayloadTooLarge(len));
    }
    Ok(len as u32)
}

fn write_header<B: ByteOrder>(header: &mut [u8], data_len: u32, format: &PcmFormat) {
    // RIFF chunk
    header[0..4].copy_from_slice(b"RIFF");
    B::write_u32(&mut header[4..8], 36 + data_len);
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    B::write_u32(&mut header[16..20], 16);
    B::write_u16(&mut header[20..22], 1); // PCM
    B::write_u16(&mut header[22..24], format.num_channels);
    B::write_u32(&mut header[24..28], format.sample_rate);
    B::write_u32(&mut header[28..32], format.byte_rate());
    B::write_u16(&mut header[32..34], format.block_align());
    B::write_u16(&mut header[34..36], format.sample_bits.bits());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    B::write_u32(&mut header[40..44], data_len);
}

/// Quantizes float samples and wraps them into a complete WAV byte stream.
pub fn encode_wav_from_samples(
    samples: &[f32],
    format: &PcmFormat,
) -> Result<Vec<u8>, ConfigError> {
    encode_wav_for(&encode_pcm_for(samples, format), format)
}

pub fn write_wav_file(path: impl AsRef<Path>, samples: &[f32], format: &PcmFormat) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode_wav_from_samples(samples, format)?;
    std::fs::write(path, &bytes)
        .with_context(|| format!("Failed to write WAV file {}", path.display()))?;
    log::info!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::encode_pcm;
    use std::io::Cursor;

    #[test]
    fn empty_payload_header_layout() {
        let wav = encode_wav(&[], 16_000, 1, SampleBits::Sixteen, Endianness::Little).unwrap();

        assert_eq!(wav.len(), 44);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[4..8], &36u32.to_le_bytes());
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(&wav[16..20], &16u32.to_le_bytes());
        assert_eq!(&wav[20..22], &1u16.to_le_bytes());
        assert_eq!(&wav[22..24], &1u16.to_le_bytes());
        assert_eq!(&wav[24..28], &16_000u32.to_le_bytes());
        assert_eq!(&wav[28..32], &32_000u32.to_le_bytes());
        assert_eq!(&wav[32..34], &2u16.to_le_bytes());
        assert_eq!(&wav[34..36], &16u16.to_le_bytes());
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(&wav[40..44], &0u32.to_le_bytes());
    }

    #[test]
    fn payload_is_appended_verbatim() {
        let pcm = vec![1, 2, 3, 4, 5, 6];
        let wav = encode_wav(&pcm, 8_000, 2, SampleBits::Eight, Endianness::Little).unwrap();

        assert_eq!(wav.len(), 50);
        assert_eq!(&wav[4..8], &42u32.to_le_bytes());
        assert_eq!(&wav[28..32], &16_000u32.to_le_bytes());
        assert_eq!(&wav[32..34], &2u16.to_le_bytes());
        assert_eq!(&wav[34..36], &8u16.to_le_bytes());
        assert_eq!(&wav[40..44], &6u32.to_le_bytes());
        assert_eq!(&wav[44..], &pcm[..]);
    }

    #[test]
    fn big_endian_header_fields() {
        let wav = encode_wav(&[0; 4], 44_100, 2, SampleBits::Sixteen, Endianness::Big).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[4..8], &40u32.to_be_bytes());
        assert_eq!(&wav[22..24], &2u16.to_be_bytes());
        assert_eq!(&wav[24..28], &44_100u32.to_be_bytes());
        assert_eq!(&wav[28..32], &176_400u32.to_be_bytes());
        assert_eq!(&wav[40..44], &4u32.to_be_bytes());
    }

    #[test]
    fn little_endian_output_reads_back_with_hound() {
        let samples = vec![0.0, 1.0, -1.0, 0.5, -0.25];
        let format = PcmFormat {
            sample_rate: 16_000,
            num_channels: 1,
            sample_bits: SampleBits::Sixteen,
            endianness: Endianness::Little,
        };
        let wav = encode_wav_from_samples(&samples, &format).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.bits_per_sample, 16);

        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, vec![0, 32767, -32768, 16384, -8192]);
    }

    #[test]
    fn wav_encoding_is_deterministic() {
        let pcm = encode_pcm(&[0.3, -0.6, 0.9], SampleBits::Sixteen, Endianness::Little);
        let a = encode_wav(&pcm, 16_000, 1, SampleBits::Sixteen, Endianness::Little).unwrap();
        let b = encode_wav(&pcm, 16_000, 1, SampleBits::Sixteen, Endianness::Little).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn payload_length_must_fit_riff_size_field() {
        assert_eq!(payload_len(0), Ok(0));
        assert_eq!(payload_len(MAX_PAYLOAD_LEN), Ok(u32::MAX - 36));
        assert_eq!(
            payload_len(MAX_PAYLOAD_LEN + 1),
            Err(ConfigError::PayloadTooLarge(MAX_PAYLOAD_LEN + 1))
        );
    }

    #[test]
    fn writes_stereo_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.wav");
        let format = PcmFormat {
            sample_rate: 22_050,
            num_channels: 2,
            sample_bits: SampleBits::Sixteen,
            endianness: Endianness::Little,
        };
        write_wav_file(&path, &[0.5, -0.5, 0.25, -0.25], &format).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 22_050);
        assert_eq!(reader.duration(), 2);
    }
}
