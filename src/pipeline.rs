use crossbeam_channel::{Receiver, Sender};
use crate::config::ProcessOptions;
use crate::error::{ConfigError, LifecycleError};
use crate::messages::{ChannelSet, ProcessedChunk, ProcessorMessage};
use crate::processors::{ChunkSink, StreamingProcessor};
use crate::stats::{RuntimeStats, RuntimeStatsHandle};
use anyhow::{anyhow, Context, Result};
use std::thread::JoinHandle;
use std::time::Instant;

/// Sink wrapper recording every delivery in the runtime stats.
struct MeteredSink<S> {
    inner: S,
    stats: RuntimeStatsHandle,
}

impl<S: ChunkSink> ChunkSink for MeteredSink<S> {
    fn deliver(&mut self, chunk: ProcessedChunk) -> Result<()> {
        let samples = chunk.buffer.len();
        let vol = chunk.vol;
        match self.inner.deliver(chunk) {
            Ok(()) => {
                self.stats.update(|s| s.record_chunk(samples, vol));
                Ok(())
            }
            Err(e) => {
                self.stats.update(|s| s.sink_errors += 1);
                Err(e)
            }
        }
    }
}

/// Message loop owning a `StreamingProcessor`. Messages are handled strictly
/// in arrival order; the loop ends when every sender has been dropped.
pub struct Pipeline<S> {
    rx: Receiver<ProcessorMessage>,
    processor: StreamingProcessor<MeteredSink<S>>,
    stats: RuntimeStatsHandle,
}

impl<S: ChunkSink> Pipeline<S> {
    pub fn new(rx: Receiver<ProcessorMessage>, sink: S, stats: RuntimeStatsHandle) -> Self {
        let metered = MeteredSink {
            inner: sink,
            stats: stats.clone(),
        };
        Self {
            rx,
            processor: StreamingProcessor::new(metered),
            stats,
        }
    }

    pub fn run(&mut self) {
        while let Ok(message) = self.rx.recv() {
            self.dispatch(message);
        }
        log::debug!("pipeline message channel closed");
    }

    fn dispatch(&mut self, message: ProcessorMessage) {
        let start = Instant::now();
        let window_samples = match &message {
            ProcessorMessage::Data(window) => Some(window.sample_count()),
            _ => None,
        };

        if let Err(e) = self.processor.handle(message) {
            if is_rejection(&e) {
                self.stats.update(|s| s.rejected_messages += 1);
                log::warn!("Rejected processor message: {}", e);
                return;
            }
            // The window was consumed; only its delivery failed.
            log::warn!("Chunk delivery failed: {:#}", e);
        }

        if let Some(samples) = window_samples {
            let elapsed = start.elapsed().as_nanos() as u64;
            self.stats.update(|s| {
                s.windows_in += 1;
                s.samples_in += samples as u64;
                s.window_processing.record(elapsed);
            });
        }
    }
}

fn is_rejection(err: &anyhow::Error) -> bool {
    err.downcast_ref::<LifecycleError>().is_some() || err.downcast_ref::<ConfigError>().is_some()
}

/// Host-side handle to a pipeline running on its own thread.
pub struct PipelineHandle {
    tx: Option<Sender<ProcessorMessage>>,
    thread: Option<JoinHandle<()>>,
    options: ProcessOptions,
    stats: RuntimeStatsHandle,
}

impl PipelineHandle {
    /// Spawns the worker thread and sends it `options` as the first message.
    pub fn start<S>(options: ProcessOptions, sink: S) -> Result<Self>
    where
        S: ChunkSink + Send + 'static,
    {
        options.validate()?;

        // Unbounded so the audio side never blocks on a slow sink.
        let (tx, rx) = crossbeam_channel::unbounded();
        let stats = RuntimeStatsHandle::new();
        let mut pipeline = Pipeline::new(rx, sink, stats.clone());

        tx.send(ProcessorMessage::Init(options))
            .map_err(|_| anyhow!("pipeline channel closed before init"))?;

        let thread = std::thread::Builder::new()
            .name("recmeter-pipeline".to_string())
            .spawn(move || pipeline.run())
            .context("Failed to spawn pipeline thread")?;

        Ok(Self {
            tx: Some(tx),
            thread: Some(thread),
            options,
            stats,
        })
    }

    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    pub fn send_window(&self, window: ChannelSet) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(LifecycleError::Stopped)?;
        tx.send(ProcessorMessage::Data(window))
            .map_err(|_| anyhow!("pipeline thread has exited"))
    }

    /// Flushes the session, waits for the worker to drain and returns the
    /// duration of audio received, in seconds.
    pub fn stop(&mut self) -> Result<f64> {
        let tx = self.tx.take().ok_or(LifecycleError::Stopped)?;
        // Send failure means the worker is gone already; joining reports why.
        let _ = tx.send(ProcessorMessage::Stop);
        drop(tx);

        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| anyhow!("pipeline thread panicked"))?;
        }

        let samples_in = self.stats.snapshot().samples_in;
        Ok(self.options.duration_secs(samples_in))
    }

    pub fn stats(&self) -> RuntimeStats {
        self.stats.snapshot()
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        if self.tx.is_some() {
            let _ = self.stop();
        }
    }
}
