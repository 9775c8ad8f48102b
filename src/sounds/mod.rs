//! Ambient texture recipes.
//!
//! A sound is a private subgraph wired from primitives into the master bus.
//! Each recipe records every node it creates, so `dispose` can unwind the
//! whole subgraph, modulators and reverbs included. If a recipe fails part
//! way through, the nodes it already created are released before the error
//! is returned.

use tracing::{debug, warn};

use crate::{
    engine::OutputBus,
    error::GraphError,
    graph::{Graph, GraphNode, NodeId, ParamId, Primitive},
};

pub mod brown;
pub mod ocean;
pub mod rain;

pub use self::{brown::BrownNoise, ocean::OceanWaves, rain::Rain};

/// Glide used for every non-zero volume change.
pub const VOLUME_RAMP: f64 = 0.1;

/// One playing texture.
pub enum SoundNode {
    Brown(BrownNoise),
    Rain(Rain),
    Ocean(OceanWaves),
}

impl SoundNode {
    pub fn kind(&self) -> &'static str {
        match self {
            SoundNode::Brown(_) => "brown noise",
            SoundNode::Rain(_) => "rain",
            SoundNode::Ocean(_) => "ocean waves",
        }
    }

    /// Change loudness. Non-zero targets are ramped; 0 mutes at once and
    /// drops any automation still in flight.
    pub fn set_volume(&mut self, graph: &mut Graph, volume: f32) -> Result<(), GraphError> {
        let volume = volume.max(0.0);
        match self {
            SoundNode::Brown(sound) => sound.set_volume(graph, volume),
            SoundNode::Rain(sound) => sound.set_volume(graph, volume),
            SoundNode::Ocean(sound) => sound.set_volume(graph, volume),
        }
    }

    /// Stop and release every primitive. Returns how many failed to release.
    pub fn dispose(self, graph: &mut Graph) -> usize {
        let kind = self.kind();
        let failures = match self {
            SoundNode::Brown(sound) => sound.dispose(graph),
            SoundNode::Rain(sound) => sound.dispose(graph),
            SoundNode::Ocean(sound) => sound.dispose(graph),
        };
        if failures > 0 {
            warn!(sound = kind, failures, "sound disposed with failures");
        } else {
            debug!(sound = kind, "sound disposed");
        }
        failures
    }

    /// Every primitive owned by this sound.
    pub fn nodes(&self) -> &[NodeId] {
        match self {
            SoundNode::Brown(sound) => sound.nodes(),
            SoundNode::Rain(sound) => sound.nodes(),
            SoundNode::Ocean(sound) => sound.nodes(),
        }
    }
}

impl From<BrownNoise> for SoundNode {
    fn from(sound: BrownNoise) -> Self {
        SoundNode::Brown(sound)
    }
}

impl From<Rain> for SoundNode {
    fn from(sound: Rain) -> Self {
        SoundNode::Rain(sound)
    }
}

impl From<OceanWaves> for SoundNode {
    fn from(sound: OceanWaves) -> Self {
        SoundNode::Ocean(sound)
    }
}

/// Records the primitives a recipe creates.
pub struct Patch<'g> {
    graph: &'g mut Graph,
    nodes: Vec<NodeId>,
    sources: Vec<NodeId>,
}

impl<'g> Patch<'g> {
    /// Run `recipe`, then start its sources.
    ///
    /// On error every node created so far is released and the error returned.
    pub fn build<T>(
        graph: &'g mut Graph,
        recipe: impl FnOnce(&mut Patch<'g>) -> Result<T, GraphError>,
    ) -> Result<(T, Vec<NodeId>), GraphError> {
        let mut patch = Patch {
            graph,
            nodes: Vec::new(),
            sources: Vec::new(),
        };

        let built = recipe(&mut patch).and_then(|value| {
            for &source in &patch.sources {
                patch.graph.start(source)?;
            }
            Ok(value)
        });

        match built {
            Ok(value) => Ok((value, patch.nodes)),
            Err(err) => {
                warn!(error = %err, created = patch.nodes.len(), "recipe failed, releasing");
                patch.graph.dispose_all(&patch.nodes);
                Err(err)
            }
        }
    }

    pub fn graph(&mut self) -> &mut Graph {
        &mut *self.graph
    }

    pub fn add(&mut self, node: impl Into<Primitive>) -> Result<NodeId, GraphError> {
        let node = node.into();
        let is_source = node.is_source();
        let id = self.graph.add(node)?;
        self.nodes.push(id);
        if is_source {
            self.sources.push(id);
        }
        Ok(id)
    }

    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.graph.connect(from, to)
    }

    /// Connect each node to the next.
    pub fn chain(&mut self, nodes: &[NodeId]) -> Result<(), GraphError> {
        for pair in nodes.windows(2) {
            self.graph.connect(pair[0], pair[1])?;
        }
        Ok(())
    }

    pub fn modulate(&mut self, lfo: NodeId, target: NodeId, param: ParamId) -> Result<(), GraphError> {
        self.graph.connect_param(lfo, target, param)
    }

    /// Connect into the master bus. The bus only exists once audio is unlocked.
    pub fn connect_bus(&mut self, from: NodeId, bus: OutputBus) -> Result<(), GraphError> {
        self.graph.connect(from, bus.node())
    }
}

/// Mute: cancel automation and snap each gain to 0 immediately.
pub(crate) fn silence_gains(graph: &mut Graph, gains: &[NodeId]) -> Result<(), GraphError> {
    for &gain in gains {
        graph.set_param(gain, ParamId::Gain, 0.0)?;
    }
    Ok(())
}
