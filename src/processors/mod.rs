use crate::messages::ProcessedChunk;
use anyhow::{anyhow, Result};
use crossbeam_channel::Sender;

// Sub-modules
pub mod interleave;
pub mod accumulator;
pub mod volume;
pub mod streaming;

// Re-exports
pub use interleave::interleave;
pub use accumulator::ChunkAccumulator;
pub use volume::rms;
pub use streaming::{ProcessorState, StreamingProcessor};

/// Receiver of emitted chunks. Called synchronously from inside the
/// processor call that produced the chunk.
pub trait ChunkSink {
    fn deliver(&mut self, chunk: ProcessedChunk) -> Result<()>;
}

impl<F> ChunkSink for F
where
    F: FnMut(ProcessedChunk),
{
    fn deliver(&mut self, chunk: ProcessedChunk) -> Result<()> {
        self(chunk);
        Ok(())
    }
}

/// Sink forwarding chunks to another thread over a channel.
pub struct ChannelSink {
    tx: Sender<ProcessedChunk>,
}

impl ChannelSink {
    pub fn new(tx: Sender<ProcessedChunk>) -> Self {
        Self { tx }
    }
}

impl ChunkSink for ChannelSink {
    fn deliver(&mut self, chunk: ProcessedChunk) -> Result<()> {
        self.tx
            .send(chunk)
            .map_err(|_| anyhow!("chunk receiver disconnected"))
    }
}
