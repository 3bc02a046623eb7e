//! Float to integer PCM quantization.
//!
//! Samples are saturated to [-1, 1] before scaling. Negative values scale by
//! the magnitude of the integer minimum, non-negative values by the maximum,
//! so both ends of the range are reachable exactly.
//!
//! * 16-bit: signed, rounded to nearest, written in the requested byte order.
//! * 8-bit: unsigned with a +128 offset (128 is silence), truncated.
//!
//! NaN input is treated as silence.

use crate::config::{Endianness, PcmFormat, SampleBits};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

pub fn encode_pcm(samples: &[f32], sample_bits: SampleBits, endianness: Endianness) -> Vec<u8> {
    match endianness {
        Endianness::Little => encode_with::<LittleEndian>(samples, sample_bits),
        Endianness::Big => encode_with::<BigEndian>(samples, sample_bits),
    }
}

pub fn encode_pcm_for(samples: &[f32], format: &PcmFormat) -> Vec<u8> {
    encode_pcm(samples, format.sample_bits, format.endianness)
}

fn encode_with<B: ByteOrder>(samples: &[f32], sample_bits: SampleBits) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * sample_bits.bytes_per_sample());
    match sample_bits {
        SampleBits::Eight => out.extend(samples.iter().map(|&s| quantize_u8(s))),
        SampleBits::Sixteen => {
            let mut word = [0u8; 2];
            for &s in samples {
                B::write_i16(&mut word, quantize_i16(s));
                out.extend_from_slice(&word);
            }
        }
    }
    out
}

fn saturate(sample: f32) -> f32 {
    if sample.is_nan() {
        0.0
    } else {
        sample.clamp(-1.0, 1.0)
    }
}

pub fn quantize_i16(sample: f32) -> i16 {
    let s = saturate(sample);
    let scaled = if s < 0.0 { s * 32768.0 } else { s * 32767.0 };
    scaled.round() as i16
}

pub fn quantize_u8(sample: f32) -> u8 {
    let s = saturate(sample);
    let scaled = if s < 0.0 { s * 128.0 } else { s * 127.0 };
    (scaled + 128.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_bit_boundaries_little_endian() {
        let out = encode_pcm(&[1.0, -1.0, 0.0], SampleBits::Sixteen, Endianness::Little);
        assert_eq!(out, vec![0xFF, 0x7F, 0x00, 0x80, 0x00, 0x00]);
    }

    #[test]
    fn sixteen_bit_big_endian_swaps_bytes() {
        let out = encode_pcm(&[1.0, -1.0], SampleBits::Sixteen, Endianness::Big);
        assert_eq!(out, vec![0x7F, 0xFF, 0x80, 0x00]);
    }

    #[test]
    fn eight_bit_offsets_around_128() {
        let out = encode_pcm(&[0.0, 1.0, -1.0, -0.5, 0.5], SampleBits::Eight, Endianness::Little);
        assert_eq!(out, vec![128, 255, 0, 64, 191]);
    }

    #[test]
    fn out_of_range_samples_saturate() {
        assert_eq!(quantize_i16(3.5), i16::MAX);
        assert_eq!(quantize_i16(-7.0), i16::MIN);
        assert_eq!(quantize_u8(2.0), 255);
        assert_eq!(quantize_u8(-2.0), 0);
    }

    #[test]
    fn sixteen_bit_rounds_to_nearest() {
        // 0.5 * 32767 = 16383.5
        assert_eq!(quantize_i16(0.5), 16384);
        // -0.25 * 32768 = -8192 exactly
        assert_eq!(quantize_i16(-0.25), -8192);
    }

    #[test]
    fn nan_is_silence() {
        assert_eq!(quantize_i16(f32::NAN), 0);
        assert_eq!(quantize_u8(f32::NAN), 128);
    }

    #[test]
    fn output_length_follows_bit_depth() {
        let samples = vec![0.1; 37];
        assert_eq!(encode_pcm(&samples, SampleBits::Eight, Endianness::Little).len(), 37);
        assert_eq!(encode_pcm(&samples, SampleBits::Sixteen, Endianness::Big).len(), 74);
    }

    #[test]
    fn encoding_is_deterministic() {
        let samples: Vec<f32> = (0..512).map(|i| ((i as f32) * 0.013).sin()).collect();
        let format = PcmFormat::default();
        assert_eq!(encode_pcm_for(&samples, &format), encode_pcm_for(&samples, &format));
    }
}
