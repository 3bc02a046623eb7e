use crate::config::ProcessOptions;
use crate::error::LifecycleError;
use crate::messages::{ChannelSet, ProcessedChunk, ProcessorMessage};
use super::{interleave, rms, ChunkAccumulator, ChunkSink};
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Idle,
    Initialized,
    Processing,
    Stopped,
}

struct Session {
    options: ProcessOptions,
    accumulator: ChunkAccumulator,
    samples_in: u64,
}

/// Per-window glue between the audio source and the notification sink.
///
/// Each window is interleaved and appended to the accumulator; every full
/// `process_size` chunk is metered and delivered to the sink before the call
/// returns. `stop` flushes the remainder as one terminal chunk.
///
/// Misuse (data before init, init while processing, anything after stop
/// other than a fresh init) is rejected with a `LifecycleError` and leaves the
/// processor untouched.
pub struct StreamingProcessor<S> {
    state: ProcessorState,
    session: Option<Session>,
    sink: S,
}

impl<S: ChunkSink> StreamingProcessor<S> {
    pub fn new(sink: S) -> Self {
        Self {
            state: ProcessorState::Idle,
            session: None,
            sink,
        }
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    pub fn options(&self) -> Option<&ProcessOptions> {
        self.session.as_ref().map(|s| &s.options)
    }

    /// Interleaved samples received since the last init.
    pub fn samples_received(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.samples_in)
    }

    /// Samples waiting for the next chunk boundary.
    pub fn pending(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.accumulator.len())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn init(&mut self, options: ProcessOptions) -> Result<()> {
        if self.state == ProcessorState::Processing {
            return Err(LifecycleError::AlreadyProcessing.into());
        }
        options.validate()?;

        self.session = Some(Session {
            options,
            accumulator: ChunkAccumulator::new(options.process_size),
            samples_in: 0,
        });
        self.state = ProcessorState::Initialized;
        log::debug!(
            "processor initialized: process_size={} channels={} rate={}",
            options.process_size,
            options.num_channels,
            options.sample_rate
        );
        Ok(())
    }

    /// Feeds one render window. Returns the number of chunks delivered.
    pub fn process_window(&mut self, window: ChannelSet) -> Result<usize> {
        let session = match (self.state, self.session.as_mut()) {
            (ProcessorState::Stopped, _) => return Err(LifecycleError::Stopped.into()),
            (_, None) | (ProcessorState::Idle, _) => {
                return Err(LifecycleError::NotInitialized.into())
            }
            (_, Some(session)) => session,
        };

        let expected = session.options.num_channels;
        if window.channels() != expected {
            return Err(LifecycleError::ChannelCountMismatch {
                expected,
                actual: window.channels(),
            }
            .into());
        }

        let samples = interleave(window);
        session.samples_in += samples.len() as u64;
        session.accumulator.append(&samples);
        self.state = ProcessorState::Processing;

        let mut ready = Vec::new();
        while let Some(buffer) = session.accumulator.try_emit() {
            ready.push(buffer);
        }

        // Every ready chunk is offered to the sink even if an earlier one failed.
        let emitted = ready.len();
        let mut first_err = None;
        for buffer in ready {
            if let Err(e) = self.emit(buffer, false) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(emitted),
        }
    }

    /// Flushes the pending tail as the terminal chunk, which is delivered even
    /// when empty.
    pub fn stop(&mut self) -> Result<()> {
        let session = match (self.state, self.session.as_mut()) {
            (ProcessorState::Stopped, _) => return Err(LifecycleError::Stopped.into()),
            (_, None) | (ProcessorState::Idle, _) => {
                return Err(LifecycleError::NotInitialized.into())
            }
            (_, Some(session)) => session,
        };

        let tail = session.accumulator.flush();
        self.state = ProcessorState::Stopped;
        log::debug!("processor stopped, flushing {} samples", tail.len());
        self.emit(tail, true)
    }

    pub fn handle(&mut self, message: ProcessorMessage) -> Result<usize> {
        match message {
            ProcessorMessage::Init(options) => self.init(options).map(|_| 0),
            ProcessorMessage::Data(window) => self.process_window(window),
            ProcessorMessage::Stop => self.stop().map(|_| 1),
        }
    }

    fn emit(&mut self, buffer: Vec<f32>, is_final: bool) -> Result<()> {
        let vol = rms(&buffer);
        log::trace!("emitting chunk: {} samples, vol {:.4}, final {}", buffer.len(), vol, is_final);
        self.sink.deliver(ProcessedChunk { buffer, vol, is_final })
    }
}
