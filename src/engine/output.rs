use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    FromSample, Sample, SizedSample,
};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, error, info};

use crate::{error::EngineError, graph::SharedGraph, MAX_BLOCK_SIZE};

/// Lifecycle of the audio context behind an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Not producing sound yet, or interrupted by the platform.
    Suspended,
    Running,
    Closed,
}

/// Somewhere the graph can be rendered to.
///
/// `resume` is the unlock step: it opens the context on first use, resumes
/// it afterwards and reports the resulting state. Platforms that gate audio
/// behind a user gesture fail or stay suspended until it is called from one.
pub trait AudioOutput {
    fn resume(&mut self, graph: &SharedGraph) -> Result<ContextState, EngineError>;

    fn state(&self) -> ContextState;

    /// Release the context. A later `resume` may open a new one.
    fn close(&mut self);
}

/*
Device Output
=============

The cpal stream renders the shared graph from its callback:

  control thread ──lock──┐
                         ▼
                 Arc<Mutex<Graph>> ◀──lock── cpal callback ──→ device
                                                   │
                                           peak ───┴──→ rtrb ring ──→ meter

The graph is mono; every device channel receives the same sample. If the
lock is unavailable (poisoned) the callback writes silence instead of
panicking on the audio thread.

Stream errors (device unplugged, backend reset) mark the output as faulted,
which reports as Suspended so the next `resume` rebuilds the stream.
*/

pub struct CpalOutput {
    stream: Option<cpal::Stream>,
    faulted: Arc<AtomicBool>,
    closed: bool,
    meter_capacity: usize,
    meter: Option<Consumer<f32>>,
}

impl CpalOutput {
    pub fn new() -> Self {
        Self {
            stream: None,
            faulted: Arc::new(AtomicBool::new(false)),
            closed: false,
            meter_capacity: 64,
            meter: None,
        }
    }

    /// Number of peak readings buffered for the meter.
    pub fn meter_capacity(mut self, capacity: usize) -> Self {
        self.meter_capacity = capacity.max(1);
        self
    }

    /// Receiver of per-callback output peaks. Available once per stream.
    pub fn take_meter(&mut self) -> Option<Consumer<f32>> {
        self.meter.take()
    }

    fn open(&mut self, graph: &SharedGraph) -> Result<(), EngineError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| EngineError::Unlock("no default output device available".into()))?;
        let supported = device
            .default_output_config()
            .map_err(|e| EngineError::Unlock(format!("failed to fetch output config: {e}")))?;

        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        let channels = config.channels as usize;
        let sample_rate = config.sample_rate.0 as f32;

        graph
            .lock()
            .map_err(|_| EngineError::Poisoned)?
            .set_sample_rate(sample_rate);

        let (producer, consumer) = RingBuffer::new(self.meter_capacity);
        self.faulted.store(false, Ordering::Release);

        let stream = match sample_format {
            cpal::SampleFormat::F32 => self.build_stream::<f32>(&device, &config, graph, producer),
            cpal::SampleFormat::I16 => self.build_stream::<i16>(&device, &config, graph, producer),
            cpal::SampleFormat::U16 => self.build_stream::<u16>(&device, &config, graph, producer),
            other => {
                return Err(EngineError::Unlock(format!(
                    "unsupported sample format {other:?}"
                )))
            }
        }?;

        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate, channels, "output stream opened"
        );

        self.stream = Some(stream);
        self.meter = Some(consumer);
        Ok(())
    }

    fn build_stream<T>(
        &self,
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        graph: &SharedGraph,
        mut meter: Producer<f32>,
    ) -> Result<cpal::Stream, EngineError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let channels = config.channels as usize;
        let graph = Arc::clone(graph);
        let faulted = Arc::clone(&self.faulted);
        let mut block = vec![0.0f32; MAX_BLOCK_SIZE];

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / channels;
                    let mut peak = 0.0f32;

                    match graph.lock() {
                        Ok(mut graph) => {
                            let mut written = 0;
                            while written < frames {
                                let len = (frames - written).min(MAX_BLOCK_SIZE);
                                let block = &mut block[..len];
                                graph.render_block(block);

                                for (i, sample) in block.iter().enumerate() {
                                    peak = peak.max(sample.abs());
                                    let value = T::from_sample(*sample);
                                    let frame = (written + i) * channels;
                                    data[frame..frame + channels].fill(value);
                                }
                                written += len;
                            }
                        }
                        Err(_) => data.fill(T::EQUILIBRIUM),
                    }

                    let _ = meter.push(peak);
                },
                move |err| {
                    error!(%err, "output stream error");
                    faulted.store(true, Ordering::Release);
                },
                None,
            )
            .map_err(|e| EngineError::Unlock(format!("failed to build output stream: {e}")))
    }
}

impl Default for CpalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for CpalOutput {
    fn resume(&mut self, graph: &SharedGraph) -> Result<ContextState, EngineError> {
        if self.faulted.load(Ordering::Acquire) {
            debug!("dropping faulted output stream");
            self.stream = None;
        }
        if self.stream.is_none() {
            self.open(graph)?;
        }
        self.closed = false;

        if let Some(stream) = &self.stream {
            stream
                .play()
                .map_err(|e| EngineError::Unlock(format!("failed to start stream: {e}")))?;
        }
        Ok(self.state())
    }

    fn state(&self) -> ContextState {
        match &self.stream {
            _ if self.closed => ContextState::Closed,
            Some(_) if !self.faulted.load(Ordering::Acquire) => ContextState::Running,
            _ => ContextState::Suspended,
        }
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
            info!("output stream closed");
        }
        self.meter = None;
        self.closed = true;
    }
}

/// Output with no device: the graph is rendered by whoever holds it.
///
/// Used for offline rendering, benchmarks and headless runs.
#[derive(Debug, Default)]
pub struct OfflineOutput {
    state: Option<ContextState>,
}

impl OfflineOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioOutput for OfflineOutput {
    fn resume(&mut self, _graph: &SharedGraph) -> Result<ContextState, EngineError> {
        self.state = Some(ContextState::Running);
        Ok(ContextState::Running)
    }

    fn state(&self) -> ContextState {
        self.state.unwrap_or(ContextState::Suspended)
    }

    fn close(&mut self) {
        self.state = Some(ContextState::Closed);
    }
}
