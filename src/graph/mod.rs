//! Signal graph hosting the primitives every texture is built from.
//!
//! The graph owns its nodes in an arena and hands out copyable `NodeId`s.
//! Audio edges sum into a node's input; parameter edges add a modulator's
//! output onto one of the target's automatable parameters. Rendering walks
//! the nodes in topological order, so any acyclic wiring is valid.
//!
//! The graph lives behind a mutex shared with the output callback. Control
//! code builds and rewires it between blocks; the callback only renders.

use std::{
    fmt,
    sync::{Arc, Mutex},
};

use petgraph::{
    algo::toposort,
    stable_graph::{NodeIndex, StableDiGraph},
    visit::EdgeRef,
    Direction,
};
use tracing::{debug, warn};

use crate::{error::GraphError, MAX_BLOCK_SIZE};

/// Compressor and limiter node.
pub mod dynamics;
/// Percussive envelope fired at scheduled clock times.
pub mod envelope;
/// State-variable filter node with automatable frequency and Q.
pub mod filter;
/// Gain stage with an automatable multiplier.
pub mod gain;
/// Low frequency oscillators for parameter modulation.
pub mod lfo;
/// Core traits shared by all graph nodes.
pub mod node;
/// White, pink and brown noise sources.
pub mod noise;
/// Automation timelines.
pub mod param;
/// Schroeder reverb node.
pub mod reverb;
/// Random retrigger tasks.
pub mod scheduler;

pub use self::{
    dynamics::DynamicsNode,
    envelope::EnvNode,
    filter::FilterNode,
    gain::GainNode,
    lfo::LfoNode,
    node::{GraphNode, ParamBlock, Primitive, RenderCtx},
    noise::NoiseNode,
    param::{Param, ParamId},
    reverb::ReverbNode,
    scheduler::{Delivery, RetriggerTask, Scheduler, TaskId},
};

pub type SharedGraph = Arc<Mutex<Graph>>;

/// Handle to a node in a `Graph`.
///
/// Ids are never reused: a handle to a disposed node stays invalid even if
/// its arena slot is recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: NodeIndex,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}.{}", self.index.index(), self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Audio,
    Param(ParamId),
}

struct NodeSlot {
    primitive: Primitive,
    generation: u32,
    params: [Option<Param>; ParamId::COUNT],
    out: Vec<f32>,
    running: bool,
}

pub struct Graph {
    nodes: StableDiGraph<NodeSlot, Edge>,
    order: Vec<NodeIndex>,
    destination: NodeId,
    scheduler: Scheduler,
    sample_rate: f32,
    time: f64,
    next_generation: u32,
    input: Vec<f32>,
    params: [Vec<f32>; ParamId::COUNT],
}

fn slot_of(nodes: &StableDiGraph<NodeSlot, Edge>, id: NodeId) -> Option<&NodeSlot> {
    nodes
        .node_weight(id.index)
        .filter(|slot| slot.generation == id.generation)
}

fn slot_of_mut(nodes: &mut StableDiGraph<NodeSlot, Edge>, id: NodeId) -> Option<&mut NodeSlot> {
    nodes
        .node_weight_mut(id.index)
        .filter(|slot| slot.generation == id.generation)
}

impl Graph {
    pub fn new(sample_rate: f32) -> Self {
        let mut nodes = StableDiGraph::new();
        let index = nodes.add_node(NodeSlot {
            primitive: Primitive::Destination,
            generation: 0,
            params: Default::default(),
            out: vec![0.0; MAX_BLOCK_SIZE],
            running: true,
        });

        Self {
            nodes,
            order: vec![index],
            destination: NodeId {
                index,
                generation: 0,
            },
            scheduler: Scheduler::new(),
            sample_rate: sample_rate.max(1.0),
            time: 0.0,
            next_generation: 1,
            input: vec![0.0; MAX_BLOCK_SIZE],
            params: std::array::from_fn(|_| vec![0.0; MAX_BLOCK_SIZE]),
        }
    }

    pub fn shared(self) -> SharedGraph {
        Arc::new(Mutex::new(self))
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Adopt the output device's rate.
    ///
    /// Nodes re-size rate dependent state and drop the signal they held, so a
    /// reopened stream does not replay tails rendered at the old rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate <= 0.0 || sample_rate == self.sample_rate {
            return;
        }
        self.sample_rate = sample_rate;
        for slot in self.nodes.node_weights_mut() {
            slot.primitive.prepare(sample_rate);
            slot.primitive.reset();
        }
        debug!(sample_rate, "graph sample rate changed");
    }

    /// Graph clock in seconds: the time of the next sample to render.
    pub fn now(&self) -> f64 {
        self.time
    }

    /// The node whose output reaches the speakers.
    pub fn destination(&self) -> NodeId {
        self.destination
    }

    pub fn contains(&self, id: NodeId) -> bool {
        slot_of(&self.nodes, id).is_some()
    }

    /// Nodes alive besides the destination.
    pub fn live_count(&self) -> usize {
        self.nodes.node_count() - 1
    }

    pub fn kind(&self, id: NodeId) -> Result<&'static str, GraphError> {
        Ok(self.slot(id)?.primitive.kind())
    }

    fn slot(&self, id: NodeId) -> Result<&NodeSlot, GraphError> {
        slot_of(&self.nodes, id).ok_or(GraphError::UnknownNode(id))
    }

    fn slot_mut(&mut self, id: NodeId) -> Result<&mut NodeSlot, GraphError> {
        slot_of_mut(&mut self.nodes, id).ok_or(GraphError::UnknownNode(id))
    }

    /// Add a primitive. Sources start stopped.
    pub fn add(&mut self, node: impl Into<Primitive>) -> Result<NodeId, GraphError> {
        let mut primitive = node.into();
        primitive.validate()?;
        primitive.prepare(self.sample_rate);

        let mut params: [Option<Param>; ParamId::COUNT] = Default::default();
        for (id, mut param) in primitive.params() {
            param.prune(self.time);
            params[id.index()] = Some(param);
        }

        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1).max(1);

        let kind = primitive.kind();
        let running = !primitive.is_source();
        let index = self.nodes.add_node(NodeSlot {
            primitive,
            generation,
            params,
            out: vec![0.0; MAX_BLOCK_SIZE],
            running,
        });
        self.order.push(index);

        let id = NodeId { index, generation };
        debug!(node = %id, kind, "node added");
        Ok(id)
    }

    /// Route `from`'s audio into `to`'s input.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.link(from, to, Edge::Audio)
    }

    /// Add `from`'s output onto `to`'s `param`, sample by sample.
    pub fn connect_param(
        &mut self,
        from: NodeId,
        to: NodeId,
        param: ParamId,
    ) -> Result<(), GraphError> {
        if self.slot(to)?.params[param.index()].is_none() {
            return Err(GraphError::NoSuchParam { node: to, param });
        }
        self.link(from, to, Edge::Param(param))
    }

    fn link(&mut self, from: NodeId, to: NodeId, edge: Edge) -> Result<(), GraphError> {
        self.slot(from)?;
        self.slot(to)?;
        if from == self.destination {
            return Err(GraphError::Destination);
        }

        let edge_index = self.nodes.add_edge(from.index, to.index, edge);
        match toposort(&self.nodes, None) {
            Ok(order) => {
                self.order = order;
                Ok(())
            }
            Err(_) => {
                self.nodes.remove_edge(edge_index);
                Err(GraphError::Cycle { from, to })
            }
        }
    }

    pub fn start(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.slot_mut(id)?.running = true;
        Ok(())
    }

    /// Silence a source. Non-sources ignore this.
    pub fn stop(&mut self, id: NodeId) -> Result<(), GraphError> {
        let slot = self.slot_mut(id)?;
        if slot.primitive.is_source() {
            slot.running = false;
        }
        Ok(())
    }

    pub fn is_running(&self, id: NodeId) -> Result<bool, GraphError> {
        Ok(self.slot(id)?.running)
    }

    /// Disconnect and free a node. Its id is invalid afterwards.
    pub fn dispose(&mut self, id: NodeId) -> Result<(), GraphError> {
        if id == self.destination {
            return Err(GraphError::Destination);
        }
        let kind = self.slot(id)?.primitive.kind();

        self.nodes.remove_node(id.index);
        self.order.retain(|index| *index != id.index);

        debug!(node = %id, kind, "node disposed");
        Ok(())
    }

    /// Stop and dispose every node, continuing past failures.
    ///
    /// Returns how many nodes could not be released.
    pub fn dispose_all(&mut self, ids: &[NodeId]) -> usize {
        release_all(ids.iter().copied(), |id| {
            self.stop(id)?;
            self.dispose(id)
        })
    }

    pub fn param(&self, id: NodeId, param: ParamId) -> Result<&Param, GraphError> {
        self.slot(id)?.params[param.index()]
            .as_ref()
            .ok_or(GraphError::NoSuchParam { node: id, param })
    }

    pub fn param_mut(&mut self, id: NodeId, param: ParamId) -> Result<&mut Param, GraphError> {
        self.slot_mut(id)?.params[param.index()]
            .as_mut()
            .ok_or(GraphError::NoSuchParam { node: id, param })
    }

    /// Automated value of `param` at the current clock, ignoring modulation.
    pub fn value(&self, id: NodeId, param: ParamId) -> Result<f32, GraphError> {
        Ok(self.param(id, param)?.value_at(self.time))
    }

    /// Glide `param` to `value` over `duration` seconds from now.
    pub fn ramp_param(
        &mut self,
        id: NodeId,
        param: ParamId,
        value: f32,
        duration: f64,
    ) -> Result<(), GraphError> {
        let now = self.time;
        self.param_mut(id, param)?.ramp_to(value, duration, now);
        Ok(())
    }

    /// Drop all automation on `param` and jump to `value` immediately.
    pub fn set_param(&mut self, id: NodeId, param: ParamId, value: f32) -> Result<(), GraphError> {
        self.param_mut(id, param)?.set_value(value);
        Ok(())
    }

    /// Queue one trigger on an envelope.
    pub fn trigger_at(&mut self, id: NodeId, time: f64) -> Result<bool, GraphError> {
        let slot = self.slot_mut(id)?;
        if !matches!(slot.primitive, Primitive::Envelope(_)) {
            return Err(GraphError::NotTriggerable(id));
        }
        Ok(slot.primitive.trigger_at(time))
    }

    pub fn pending_triggers(&self, id: NodeId) -> Result<usize, GraphError> {
        Ok(self.slot(id)?.primitive.pending_triggers())
    }

    /// Register a retrigger task and queue its first window.
    pub fn schedule(&mut self, mut task: RetriggerTask) -> Result<TaskId, GraphError> {
        let target = task.target();
        let now = self.time;
        let slot = self.slot_mut(target)?;
        if !matches!(slot.primitive, Primitive::Envelope(_)) {
            return Err(GraphError::NotTriggerable(target));
        }

        task.fill(now, |at| {
            if slot.primitive.trigger_at(at) {
                Delivery::Queued
            } else {
                Delivery::Full
            }
        });
        Ok(self.scheduler.add(task))
    }

    /// Stop a task from queuing further triggers.
    pub fn cancel_task(&mut self, id: TaskId) -> bool {
        self.scheduler.cancel(id)
    }

    pub fn has_task(&self, id: TaskId) -> bool {
        self.scheduler.contains(id)
    }

    /// Render the destination's output, advancing the clock by `out.len()`
    /// samples.
    pub fn render_block(&mut self, out: &mut [f32]) {
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.render_chunk(chunk);
        }
    }

    fn render_chunk(&mut self, out: &mut [f32]) {
        let len = out.len();
        let ctx = RenderCtx::new(self.sample_rate, self.time);

        {
            let Graph {
                nodes,
                order,
                destination,
                scheduler,
                input,
                params,
                ..
            } = self;

            scheduler.tick(ctx.time, |target, at| match slot_of_mut(nodes, target) {
                Some(slot) => {
                    if slot.primitive.trigger_at(at) {
                        Delivery::Queued
                    } else {
                        Delivery::Full
                    }
                }
                None => Delivery::Gone,
            });

            for &index in order.iter() {
                if let Some(slot) = nodes.node_weight_mut(index) {
                    for (buffer, param) in params.iter_mut().zip(slot.params.iter_mut()) {
                        if let Some(param) = param {
                            param.prune(ctx.time);
                            param.fill(&mut buffer[..len], ctx.time, ctx.sample_rate);
                        }
                    }
                }

                input[..len].fill(0.0);
                for edge in nodes.edges_directed(index, Direction::Incoming) {
                    let source = &nodes[edge.source()].out[..len];
                    let target = match *edge.weight() {
                        Edge::Audio => &mut input[..len],
                        Edge::Param(param) => &mut params[param.index()][..len],
                    };
                    for (t, s) in target.iter_mut().zip(source) {
                        *t += *s;
                    }
                }

                let NodeSlot {
                    primitive,
                    out: node_out,
                    running,
                    ..
                } = &mut nodes[index];
                let node_out = &mut node_out[..len];
                if *running {
                    let block = ParamBlock::new(params, len);
                    primitive.render_block(&input[..len], node_out, &block, &ctx);
                } else {
                    node_out.fill(0.0);
                }
            }

            match slot_of(nodes, *destination) {
                Some(slot) => out.copy_from_slice(&slot.out[..len]),
                None => out.fill(0.0),
            }
        }

        self.time += len as f64 / self.sample_rate as f64;
    }
}

/// Apply `release` to every item, logging and counting failures instead of
/// stopping at the first one.
pub fn release_all<T, E: fmt::Display>(
    items: impl IntoIterator<Item = T>,
    mut release: impl FnMut(T) -> Result<(), E>,
) -> usize {
    let mut failures = 0;
    for item in items {
        if let Err(err) = release(item) {
            warn!(error = %err, "release failed, continuing");
            failures += 1;
        }
    }
    failures
}
