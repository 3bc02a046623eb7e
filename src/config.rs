use crate::error::ConfigError;

pub const DEFAULT_PROCESS_SIZE: usize = 4096;
pub const DEFAULT_NUM_CHANNELS: u16 = 1;
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Byte order used for PCM samples and WAV header fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Byte order of the host platform.
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }

    pub fn from_little(little_endian: bool) -> Self {
        if little_endian {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }

    pub fn is_little(self) -> bool {
        self == Endianness::Little
    }
}

impl Default for Endianness {
    fn default() -> Self {
        Self::native()
    }
}

/// Quantization depth of exported PCM.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SampleBits {
    Eight,
    #[default]
    Sixteen,
}

impl SampleBits {
    pub fn bits(self) -> u16 {
        match self {
            SampleBits::Eight => 8,
            SampleBits::Sixteen => 16,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleBits::Eight => 1,
            SampleBits::Sixteen => 2,
        }
    }
}

impl TryFrom<u16> for SampleBits {
    type Error = ConfigError;

    fn try_from(bits: u16) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(SampleBits::Eight),
            16 => Ok(SampleBits::Sixteen),
            other => Err(ConfigError::UnsupportedSampleBits(other)),
        }
    }
}

/// Per-session processing configuration. Built once and handed to the
/// processor in `ProcessorMessage::Init`; never mutated afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProcessOptions {
    pub process_size: usize, // Samples per emitted chunk (interleaved count)
    pub num_channels: u16,   // 1 or 2
    pub sample_bits: SampleBits,
    pub sample_rate: u32,
    pub endianness: Endianness,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            process_size: DEFAULT_PROCESS_SIZE,
            num_channels: DEFAULT_NUM_CHANNELS,
            sample_bits: SampleBits::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            endianness: Endianness::native(),
        }
    }
}

impl ProcessOptions {
    pub fn with_process_size(mut self, process_size: usize) -> Self {
        self.process_size = process_size;
        self
    }

    pub fn with_num_channels(mut self, num_channels: u16) -> Self {
        self.num_channels = num_channels;
        self
    }

    pub fn with_sample_bits(mut self, sample_bits: SampleBits) -> Self {
        self.sample_bits = sample_bits;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.process_size == 0 {
            return Err(ConfigError::ZeroProcessSize);
        }
        if !(1..=2).contains(&self.num_channels) {
            return Err(ConfigError::UnsupportedChannelCount(self.num_channels));
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        Ok(())
    }

    /// Seconds of audio represented by `samples` interleaved samples.
    pub fn duration_secs(&self, samples: u64) -> f64 {
        samples as f64 / (self.sample_rate as f64 * self.num_channels as f64)
    }
}

/// Export configuration consumed by the PCM and WAV encoders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub num_channels: u16,
    pub sample_bits: SampleBits,
    pub endianness: Endianness,
}

impl Default for PcmFormat {
    fn default() -> Self {
        PcmFormat::from(&ProcessOptions::default())
    }
}

impl From<&ProcessOptions> for PcmFormat {
    fn from(options: &ProcessOptions) -> Self {
        Self {
            sample_rate: options.sample_rate,
            num_channels: options.num_channels,
            sample_bits: options.sample_bits,
            endianness: options.endianness,
        }
    }
}

impl PcmFormat {
    pub fn block_align(&self) -> u16 {
        self.num_channels * self.sample_bits.bytes_per_sample() as u16
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }
}
