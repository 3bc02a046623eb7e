use std::collections::VecDeque;

/// Chunk accumulator - collects interleaved samples and splits them into
/// fixed `process_size` chunks in strict FIFO order.
///
/// The tail is unbounded: appends never fail, memory is released as chunks
/// are split off.
pub struct ChunkAccumulator {
    tail: VecDeque<f32>,
    process_size: usize,
}

impl ChunkAccumulator {
    pub fn new(process_size: usize) -> Self {
        Self {
            tail: VecDeque::with_capacity(process_size * 2),
            process_size,
        }
    }

    /// Pending samples not yet emitted.
    pub fn len(&self) -> usize {
        self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tail.is_empty()
    }

    pub fn append(&mut self, samples: &[f32]) {
        self.tail.extend(samples.iter().copied());
    }

    /// Splits off exactly `process_size` samples once enough are pending.
    pub fn try_emit(&mut self) -> Option<Vec<f32>> {
        if self.tail.len() < self.process_size {
            return None;
        }
        Some(self.tail.drain(..self.process_size).collect())
    }

    /// Removes everything that is pending, possibly fewer than `process_size`
    /// samples or none at all.
    pub fn flush(&mut self) -> Vec<f32> {
        self.tail.drain(..).collect()
    }
}
