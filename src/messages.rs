use crate::config::ProcessOptions;
use crate::error::ConfigError;

/// One render window of capture data, one block per channel.
/// Stereo blocks are guaranteed equal length by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelSet {
    Mono(Vec<f32>),
    Stereo { left: Vec<f32>, right: Vec<f32> },
}

impl ChannelSet {
    pub fn mono(samples: Vec<f32>) -> Self {
        ChannelSet::Mono(samples)
    }

    pub fn stereo(left: Vec<f32>, right: Vec<f32>) -> Result<Self, ConfigError> {
        if left.len() != right.len() {
            return Err(ConfigError::ChannelLengthMismatch {
                left: left.len(),
                right: right.len(),
            });
        }
        Ok(ChannelSet::Stereo { left, right })
    }

    /// Builds a window from planar host buffers holding native-endian f32 samples.
    pub fn from_planar_bytes(planes: &[&[u8]]) -> Result<Self, ConfigError> {
        match planes {
            [mono] => Ok(ChannelSet::Mono(decode_plane(mono)?)),
            [left, right] => ChannelSet::stereo(decode_plane(left)?, decode_plane(right)?),
            other => Err(ConfigError::UnsupportedChannelCount(other.len() as u16)),
        }
    }

    pub fn channels(&self) -> u16 {
        match self {
            ChannelSet::Mono(_) => 1,
            ChannelSet::Stereo { .. } => 2,
        }
    }

    /// Total samples across all channels.
    pub fn sample_count(&self) -> usize {
        match self {
            ChannelSet::Mono(samples) => samples.len(),
            ChannelSet::Stereo { left, right } => left.len() + right.len(),
        }
    }
}

fn decode_plane(bytes: &[u8]) -> Result<Vec<f32>, ConfigError> {
    if bytes.len() % std::mem::size_of::<f32>() != 0 {
        return Err(ConfigError::MisalignedSampleBytes(bytes.len()));
    }
    // Host buffers carry no alignment guarantee, so copy out rather than cast in place.
    Ok(bytemuck::pod_collect_to_vec::<u8, f32>(bytes))
}

/// A chunk handed to the notification sink.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedChunk {
    pub buffer: Vec<f32>, // Interleaved samples
    pub vol: f32,         // RMS over `buffer` only
    pub is_final: bool,   // Terminal emission produced by stop
}

/// Messages driving a processor across the host/worker boundary, delivered in order.
#[derive(Debug, Clone)]
pub enum ProcessorMessage {
    Init(ProcessOptions),
    Data(ChannelSet),
    Stop,
}
