//! Streams a raw capture through the chunking pipeline and exports it as WAV.
//!
//! The input is interleaved little-endian f32 samples, as dumped by most
//! capture tools. Volume readings for every emitted chunk are logged at info.

use anyhow::{bail, Context, Result};
use byteorder::{ByteOrder, LittleEndian};
use clap::Parser;
use log::LevelFilter;
use recmeter::{
    ChannelSet, ChannelSink, Endianness, PcmFormat, PipelineHandle, ProcessOptions, SampleBits,
};
use std::path::{Path, PathBuf};

/// Frames per render window fed to the pipeline.
const RENDER_QUANTUM: usize = 128;

#[derive(Parser, Debug)]
#[command(name = "recmeter")]
#[command(about = "Chunk, meter and export a raw f32 capture as WAV", long_about = None)]
struct Args {
    /// Raw interleaved little-endian f32 input
    input: PathBuf,

    /// WAV output path
    #[arg(short, long, default_value = "capture.wav")]
    output: PathBuf,

    #[arg(long, default_value_t = 16_000)]
    sample_rate: u32,

    #[arg(long, default_value_t = 1)]
    channels: u16,

    /// 8 or 16
    #[arg(long, default_value_t = 16)]
    sample_bits: u16,

    /// Samples per emitted chunk
    #[arg(long, default_value_t = 4096)]
    process_size: usize,

    /// Write big-endian PCM and header fields
    #[arg(long)]
    big_endian: bool,

    /// -v = debug, -vv = trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn options(&self) -> Result<ProcessOptions> {
        let endianness = if self.big_endian {
            Endianness::Big
        } else {
            Endianness::Little
        };
        let options = ProcessOptions {
            process_size: self.process_size,
            num_channels: self.channels,
            sample_bits: SampleBits::try_from(self.sample_bits)?,
            sample_rate: self.sample_rate,
            endianness,
        };
        options.validate()?;
        Ok(options)
    }
}

fn read_samples(path: &Path) -> Result<Vec<f32>> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let usable = bytes.len() - bytes.len() % 4;
    if usable != bytes.len() {
        log::warn!("ignoring {} trailing bytes", bytes.len() - usable);
    }
    let mut samples = vec![0.0f32; usable / 4];
    LittleEndian::read_f32_into(&bytes[..usable], &mut samples);
    Ok(samples)
}

fn window_from_frames(frames: &[f32], channels: u16) -> Result<ChannelSet> {
    if channels == 1 {
        return Ok(ChannelSet::mono(frames.to_vec()));
    }
    let left = frames.iter().step_by(2).copied().collect();
    let right = frames.iter().skip(1).step_by(2).copied().collect();
    Ok(ChannelSet::stereo(left, right)?)
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("recmeter", args.log_level())
        .init();

    let options = args.options()?;
    let samples = read_samples(&args.input)?;
    let channels = options.num_channels as usize;
    if samples.len() % channels != 0 {
        bail!("{} samples do not divide into {} channels", samples.len(), channels);
    }

    let (chunk_tx, chunk_rx) = crossbeam_channel::unbounded();
    let mut handle = PipelineHandle::start(options, ChannelSink::new(chunk_tx))?;
    for frames in samples.chunks(RENDER_QUANTUM * channels) {
        handle.send_window(window_from_frames(frames, options.num_channels)?)?;
    }
    let duration = handle.stop()?;

    let mut captured = Vec::with_capacity(samples.len());
    for (index, chunk) in chunk_rx.try_iter().enumerate() {
        log::info!(
            "chunk {:>4}: {:>5} samples, vol {:.4}{}",
            index,
            chunk.buffer.len(),
            chunk.vol,
            if chunk.is_final { " (final)" } else { "" }
        );
        captured.extend(chunk.buffer);
    }

    let stats = handle.stats();
    log::info!(
        "{:.2}s captured, {} windows, {} chunks, peak vol {:.4}",
        duration,
        stats.windows_in,
        stats.chunks_out,
        stats.peak_vol
    );

    recmeter::write_wav_file(&args.output, &captured, &PcmFormat::from(&options))
}
