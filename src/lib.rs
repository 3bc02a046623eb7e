//! Streaming capture processing: interleaves render windows, splits them into
//! fixed-size chunks with an RMS volume reading, and encodes captured samples
//! as PCM and WAV byte streams.

pub mod config;
pub mod error;
pub mod messages;
pub mod processors;
pub mod pcm;
pub mod wav;
pub mod pipeline;
pub mod stats;
#[cfg(feature = "python")]
mod python;

pub use config::{Endianness, PcmFormat, ProcessOptions, SampleBits};
pub use error::{ConfigError, LifecycleError};
pub use messages::{ChannelSet, ProcessedChunk, ProcessorMessage};
pub use processors::{
    interleave, rms, ChannelSink, ChunkAccumulator, ChunkSink, ProcessorState, StreamingProcessor,
};
pub use pcm::{encode_pcm, encode_pcm_for};
pub use wav::{encode_wav, encode_wav_for, encode_wav_from_samples, write_wav_file};
pub use pipeline::PipelineHandle;
pub use stats::RuntimeStats;
