use crate::config::{Endianness, PcmFormat, ProcessOptions, SampleBits};
use crate::error::ConfigError;
use crate::messages::{ChannelSet, ProcessedChunk};
use crate::pipeline::PipelineHandle;
use crate::processors::ChunkSink;
use anyhow::anyhow;
use numpy::PyArray1;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict};

fn config_err(e: ConfigError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn runtime_err(e: anyhow::Error) -> PyErr {
    PyRuntimeError::new_err(format!("{:#}", e))
}

/// Delivers chunks to a Python callable as `{"vol", "buffer", "final"}` dicts.
struct PyCallbackSink {
    callback: Py<PyAny>,
}

impl ChunkSink for PyCallbackSink {
    fn deliver(&mut self, chunk: ProcessedChunk) -> anyhow::Result<()> {
        Python::attach(|py| -> PyResult<()> {
            let data = PyDict::new(py);
            data.set_item("vol", chunk.vol)?;
            data.set_item("final", chunk.is_final)?;
            data.set_item("buffer", PyArray1::from_vec(py, chunk.buffer))?;
            self.callback.call1(py, (data,))?;
            Ok(())
        })
        .map_err(|e| anyhow!("Python callback error: {}", e))
    }
}

#[pyclass]
struct Recorder {
    options: ProcessOptions,
    handle: Option<PipelineHandle>,
}

#[pymethods]
impl Recorder {
    #[new]
    #[pyo3(signature = (
        process_size=4096,
        num_channels=1,
        sample_bits=16,
        sample_rate=16000,
        little_endian=None
    ))]
    fn new(
        process_size: usize,
        num_channels: u16,
        sample_bits: u16,
        sample_rate: u32,
        little_endian: Option<bool>,
    ) -> PyResult<Self> {
        let options = ProcessOptions {
            process_size,
            num_channels,
            sample_bits: SampleBits::try_from(sample_bits).map_err(config_err)?,
            sample_rate,
            endianness: little_endian.map_or_else(Endianness::native, Endianness::from_little),
        };
        options.validate().map_err(config_err)?;
        Ok(Self {
            options,
            handle: None,
        })
    }

    #[getter]
    fn little_endian(&self) -> bool {
        self.options.endianness.is_little()
    }

    #[getter]
    fn is_recording(&self) -> bool {
        self.handle.is_some()
    }

    fn start(&mut self, callback: Py<PyAny>) -> PyResult<()> {
        if self.handle.is_some() {
            return Err(PyRuntimeError::new_err("already recording"));
        }
        let handle = PipelineHandle::start(self.options, PyCallbackSink { callback })
            .map_err(runtime_err)?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Queues one render window. `right` is required for stereo recorders.
    #[pyo3(signature = (left, right=None))]
    fn feed(&self, left: Vec<f32>, right: Option<Vec<f32>>) -> PyResult<()> {
        let handle = self
            .handle
            .as_ref()
            .ok_or_else(|| PyRuntimeError::new_err("not recording"))?;
        let window = match right {
            Some(right) => ChannelSet::stereo(left, right).map_err(config_err)?,
            None => ChannelSet::mono(left),
        };
        handle.send_window(window).map_err(runtime_err)
    }

    /// Stops recording and returns the captured duration in seconds.
    fn stop(&mut self, py: Python<'_>) -> PyResult<f64> {
        let mut handle = self
            .handle
            .take()
            .ok_or_else(|| PyRuntimeError::new_err("not recording"))?;
        // The worker needs the GIL to run the callback for the final chunk.
        py.detach(move || handle.stop()).map_err(runtime_err)
    }

    fn encode_pcm<'py>(&self, py: Python<'py>, samples: Vec<f32>) -> Bound<'py, PyBytes> {
        let format = PcmFormat::from(&self.options);
        PyBytes::new(py, &crate::pcm::encode_pcm_for(&samples, &format))
    }

    fn encode_wav<'py>(
        &self,
        py: Python<'py>,
        samples: Vec<f32>,
    ) -> PyResult<Bound<'py, PyBytes>> {
        let format = PcmFormat::from(&self.options);
        let wav = crate::wav::encode_wav_from_samples(&samples, &format).map_err(config_err)?;
        Ok(PyBytes::new(py, &wav))
    }

    fn get_stats<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let s = self
            .handle
            .as_ref()
            .map(|h| h.stats())
            .unwrap_or_default();
        let dict = PyDict::new(py);
        dict.set_item("windows_in", s.windows_in)?;
        dict.set_item("samples_in", s.samples_in)?;
        dict.set_item("chunks_out", s.chunks_out)?;
        dict.set_item("samples_out", s.samples_out)?;
        dict.set_item("rejected_messages", s.rejected_messages)?;
        dict.set_item("sink_errors", s.sink_errors)?;
        dict.set_item("last_vol", s.last_vol)?;
        dict.set_item("peak_vol", s.peak_vol)?;
        dict.set_item("window_avg_ms", s.window_processing.avg_ns() / 1_000_000.0)?;
        dict.set_item("window_max_ms", s.window_processing.max_ns as f64 / 1_000_000.0)?;
        Ok(dict)
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            Python::attach(|py| py.detach(move || drop(handle)));
        }
    }
}

#[pyfunction]
fn interleave(left: Vec<f32>, right: Option<Vec<f32>>) -> PyResult<Vec<f32>> {
    let window = match right {
        Some(right) => ChannelSet::stereo(left, right).map_err(config_err)?,
        None => ChannelSet::mono(left),
    };
    Ok(crate::processors::interleave(window))
}

#[pyfunction]
fn rms(samples: Vec<f32>) -> f32 {
    crate::processors::rms(&samples)
}

#[pyfunction]
#[pyo3(name = "encode_pcm", signature = (samples, sample_bits=16, little_endian=None))]
fn encode_pcm_py<'py>(
    py: Python<'py>,
    samples: Vec<f32>,
    sample_bits: u16,
    little_endian: Option<bool>,
) -> PyResult<Bound<'py, PyBytes>> {
    let bits = SampleBits::try_from(sample_bits).map_err(config_err)?;
    let endianness = little_endian.map_or_else(Endianness::native, Endianness::from_little);
    Ok(PyBytes::new(py, &crate::pcm::encode_pcm(&samples, bits, endianness)))
}

#[pyfunction]
#[pyo3(name = "encode_wav", signature = (
    pcm,
    sample_rate=16000,
    num_channels=1,
    sample_bits=16,
    little_endian=None
))]
fn encode_wav_py<'py>(
    py: Python<'py>,
    pcm: Vec<u8>,
    sample_rate: u32,
    num_channels: u16,
    sample_bits: u16,
    little_endian: Option<bool>,
) -> PyResult<Bound<'py, PyBytes>> {
    let bits = SampleBits::try_from(sample_bits).map_err(config_err)?;
    let endianness = little_endian.map_or_else(Endianness::native, Endianness::from_little);
    let wav = crate::wav::encode_wav(&pcm, sample_rate, num_channels, bits, endianness)
        .map_err(config_err)?;
    Ok(PyBytes::new(py, &wav))
}

#[pymodule]
fn recmeter(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Recorder>()?;
    m.add_function(wrap_pyfunction!(interleave, m)?)?;
    m.add_function(wrap_pyfunction!(rms, m)?)?;
    m.add_function(wrap_pyfunction!(encode_pcm_py, m)?)?;
    m.add_function(wrap_pyfunction!(encode_wav_py, m)?)?;
    Ok(())
}
