use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, Default)]
pub struct StageStats {
    pub samples: u64,
    pub total_ns: u128,
    pub max_ns: u64,
}

impl StageStats {
    pub fn record(&mut self, duration_ns: u64) {
        self.samples += 1;
        self.total_ns += duration_ns as u128;
        self.max_ns = self.max_ns.max(duration_ns);
    }

    pub fn avg_ns(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.total_ns as f64 / self.samples as f64
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RuntimeStats {
    pub windows_in: u64,
    pub samples_in: u64,
    pub chunks_out: u64,
    pub samples_out: u64,
    pub rejected_messages: u64,
    pub sink_errors: u64,

    pub last_vol: f32,
    pub peak_vol: f32,

    pub window_processing: StageStats,
}

impl RuntimeStats {
    pub fn record_chunk(&mut self, samples: usize, vol: f32) {
        self.chunks_out += 1;
        self.samples_out += samples as u64;
        self.last_vol = vol;
        self.peak_vol = self.peak_vol.max(vol);
    }
}

#[derive(Clone, Default)]
pub struct RuntimeStatsHandle {
    inner: Arc<Mutex<RuntimeStats>>,
}

impl RuntimeStatsHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update<F>(&self, update_fn: F)
    where
        F: FnOnce(&mut RuntimeStats),
    {
        if let Ok(mut stats) = self.inner.lock() {
            update_fn(&mut stats);
        }
    }

    pub fn snapshot(&self) -> RuntimeStats {
        if let Ok(stats) = self.inner.lock() {
            stats.clone()
        } else {
            RuntimeStats::default()
        }
    }
}
