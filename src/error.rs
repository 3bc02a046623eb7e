use thiserror::Error;

/// Invalid configuration or malformed input, rejected before any output is produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("process size must be greater than zero")]
    ZeroProcessSize,
    #[error("unsupported channel count {0}, expected 1 or 2")]
    UnsupportedChannelCount(u16),
    #[error("unsupported sample bits {0}, expected 8 or 16")]
    UnsupportedSampleBits(u16),
    #[error("sample rate must be greater than zero")]
    ZeroSampleRate,
    #[error("stereo channel length mismatch: left {left}, right {right}")]
    ChannelLengthMismatch { left: usize, right: usize },
    #[error("sample buffer of {0} bytes is not a whole number of f32 samples")]
    MisalignedSampleBytes(usize),
    #[error("PCM payload of {0} bytes does not fit a WAV header")]
    PayloadTooLarge(usize),
}

/// Processor misuse. Recoverable: the processor state is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("processor has not been initialized")]
    NotInitialized,
    #[error("processor is already processing; stop before re-initializing")]
    AlreadyProcessing,
    #[error("processor has been stopped")]
    Stopped,
    #[error("window has {actual} channel(s), processor expects {expected}")]
    ChannelCountMismatch { expected: u16, actual: u16 },
}
