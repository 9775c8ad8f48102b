//! The audio engine: one shared graph, one master bus and the unlock gate.
//!
//! Nothing may be connected to the output before the context is running.
//! The engine enforces that with `OutputBus`, a handle only handed out while
//! `is_ready()` holds. Sound recipes take an `OutputBus` as their
//! destination, so they cannot be built early.

use tracing::{info, warn};

use crate::{
    error::EngineError,
    graph::{GainNode, Graph, NodeId, ParamId, SharedGraph},
};

pub mod config;
pub mod output;

pub use self::{
    config::EngineConfig,
    output::{AudioOutput, ContextState, CpalOutput, OfflineOutput},
};

/// Capability to connect into the master bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputBus(NodeId);

impl OutputBus {
    pub fn node(self) -> NodeId {
        self.0
    }
}

pub struct AudioEngine<O = CpalOutput> {
    output: O,
    graph: SharedGraph,
    master: Option<NodeId>,
    config: EngineConfig,
}

impl<O: AudioOutput> AudioEngine<O> {
    pub fn new(output: O, config: EngineConfig) -> Self {
        Self {
            output,
            graph: Graph::new(config.sample_rate).shared(),
            master: None,
            config,
        }
    }

    /// Unlock audio. Idempotent and never fails loudly.
    ///
    /// Returns true when the engine is ready afterwards. Call this from a user
    /// gesture (a key press, a click) on platforms that require one.
    pub fn initialize(&mut self) -> bool {
        if self.is_ready() {
            return true;
        }

        match self.unlock() {
            Ok(()) => {
                info!("audio engine ready");
                true
            }
            Err(err) => {
                warn!(error = %err, "audio unlock failed");
                false
            }
        }
    }

    fn unlock(&mut self) -> Result<(), EngineError> {
        let state = self.output.resume(&self.graph)?;
        if state != ContextState::Running {
            return Err(EngineError::Unlock(format!(
                "context is {state:?} after resume"
            )));
        }

        if self.master.is_none() {
            let mut graph = self.graph.lock().map_err(|_| EngineError::Poisoned)?;
            let master = graph.add(GainNode::new(self.config.master_level))?;
            let destination = graph.destination();
            graph.connect(master, destination)?;
            self.master = Some(master);
        }
        Ok(())
    }

    /// Context running and master bus wired.
    pub fn is_ready(&self) -> bool {
        self.master.is_some() && self.output.state() == ContextState::Running
    }

    pub fn context_state(&self) -> ContextState {
        self.output.state()
    }

    /// The master bus, only while ready.
    pub fn bus(&self) -> Option<OutputBus> {
        if self.is_ready() {
            self.master.map(OutputBus)
        } else {
            None
        }
    }

    pub fn graph(&self) -> &SharedGraph {
        &self.graph
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Glide the master bus to `level`, clamped to `[0, 1]`.
    ///
    /// Before unlock only the configured level changes; the bus picks it up
    /// when it is built.
    pub fn set_master_level(&mut self, level: f32) -> Result<(), EngineError> {
        let level = level.clamp(0.0, 1.0);
        self.config.master_level = level;
        if let Some(master) = self.master {
            let mut graph = self.graph.lock().map_err(|_| EngineError::Poisoned)?;
            graph.ramp_param(master, ParamId::Gain, level, self.config.master_ramp)?;
        }
        Ok(())
    }

    /// Drop the master bus and close the context.
    pub fn dispose(&mut self) {
        if let Some(master) = self.master.take() {
            match self.graph.lock() {
                Ok(mut graph) => {
                    if let Err(err) = graph.dispose(master) {
                        warn!(error = %err, "failed to release master bus");
                    }
                }
                Err(_) => warn!("graph lock poisoned while disposing engine"),
            }
        }
        self.output.close();
        info!("audio engine disposed");
    }
}

impl AudioEngine<CpalOutput> {
    /// Engine on the default output device.
    pub fn with_device(config: EngineConfig) -> Self {
        Self::new(CpalOutput::new().meter_capacity(config.meter_capacity), config)
    }
}
