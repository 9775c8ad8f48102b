use crate::{
    error::GraphError,
    graph::{
        dynamics::DynamicsNode, envelope::EnvNode, filter::FilterNode, gain::GainNode,
        lfo::LfoNode, noise::NoiseNode, param::Param, param::ParamId, reverb::ReverbNode,
    },
};

/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: Graph clock at the first sample of the block, in seconds
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, time: f64) -> Self {
        Self { sample_rate, time }
    }

    /// Clock time of sample `index` within the block.
    #[inline]
    pub fn time_at(&self, index: usize) -> f64 {
        self.time + index as f64 / self.sample_rate as f64
    }
}

/// Per-sample parameter values for one block, automation plus modulation.
pub struct ParamBlock<'a> {
    buffers: &'a [Vec<f32>; ParamId::COUNT],
    len: usize,
}

impl<'a> ParamBlock<'a> {
    pub(crate) fn new(buffers: &'a [Vec<f32>; ParamId::COUNT], len: usize) -> Self {
        Self { buffers, len }
    }

    #[inline]
    pub fn get(&self, param: ParamId) -> &[f32] {
        &self.buffers[param.index()][..self.len]
    }
}

/// Core trait for audio processing graph nodes
///
/// Nodes read the summed audio input and their resolved parameters, and
/// write exactly `out.len()` samples.
pub trait GraphNode: Send {
    fn render_block(
        &mut self,
        input: &[f32],
        out: &mut [f32],
        params: &ParamBlock<'_>,
        ctx: &RenderCtx,
    );

    /// Automatable parameters and their initial values.
    fn params(&self) -> Vec<(ParamId, Param)> {
        Vec::new()
    }

    /// Reject construction values that cannot be rendered.
    fn validate(&self) -> Result<(), GraphError> {
        Ok(())
    }

    /// Size internal state for the sample rate. Runs off the audio thread.
    fn prepare(&mut self, _sample_rate: f32) {}

    /// Queue a trigger at an absolute clock time.
    ///
    /// Returns false for nodes that cannot be triggered.
    fn trigger_at(&mut self, _time: f64) -> bool {
        false
    }

    /// Triggers queued but not yet fired.
    fn pending_triggers(&self) -> usize {
        0
    }

    /// Sources stay silent until started.
    fn is_source(&self) -> bool {
        false
    }

    /// Drop signal memory (filter state, tails, detector levels).
    ///
    /// Queued triggers are clock times and survive a reset.
    fn reset(&mut self) {}
}

/// Every primitive the graph can host.
pub enum Primitive {
    Noise(NoiseNode),
    Lfo(LfoNode),
    Filter(FilterNode),
    Gain(GainNode),
    Envelope(EnvNode),
    Reverb(ReverbNode),
    Dynamics(DynamicsNode),
    /// The hardware output; passes its input through.
    Destination,
}

impl Primitive {
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Noise(_) => "noise",
            Primitive::Lfo(_) => "lfo",
            Primitive::Filter(_) => "filter",
            Primitive::Gain(_) => "gain",
            Primitive::Envelope(_) => "envelope",
            Primitive::Reverb(_) => "reverb",
            Primitive::Dynamics(node) if node.is_limiter() => "limiter",
            Primitive::Dynamics(_) => "compressor",
            Primitive::Destination => "destination",
        }
    }

    fn node(&self) -> Option<&dyn GraphNode> {
        match self {
            Primitive::Noise(n) => Some(n),
            Primitive::Lfo(n) => Some(n),
            Primitive::Filter(n) => Some(n),
            Primitive::Gain(n) => Some(n),
            Primitive::Envelope(n) => Some(n),
            Primitive::Reverb(n) => Some(n),
            Primitive::Dynamics(n) => Some(n),
            Primitive::Destination => None,
        }
    }

    fn node_mut(&mut self) -> Option<&mut dyn GraphNode> {
        match self {
            Primitive::Noise(n) => Some(n),
            Primitive::Lfo(n) => Some(n),
            Primitive::Filter(n) => Some(n),
            Primitive::Gain(n) => Some(n),
            Primitive::Envelope(n) => Some(n),
            Primitive::Reverb(n) => Some(n),
            Primitive::Dynamics(n) => Some(n),
            Primitive::Destination => None,
        }
    }
}

impl GraphNode for Primitive {
    fn render_block(
        &mut self,
        input: &[f32],
        out: &mut [f32],
        params: &ParamBlock<'_>,
        ctx: &RenderCtx,
    ) {
        match self.node_mut() {
            Some(node) => node.render_block(input, out, params, ctx),
            None => out.copy_from_slice(&input[..out.len()]),
        }
    }

    fn params(&self) -> Vec<(ParamId, Param)> {
        self.node().map(|n| n.params()).unwrap_or_default()
    }

    fn validate(&self) -> Result<(), GraphError> {
        match self {
            Primitive::Destination => Err(GraphError::Destination),
            other => other.node().map_or(Ok(()), |n| n.validate()),
        }
    }

    fn prepare(&mut self, sample_rate: f32) {
        if let Some(node) = self.node_mut() {
            node.prepare(sample_rate);
        }
    }

    fn trigger_at(&mut self, time: f64) -> bool {
        self.node_mut().is_some_and(|n| n.trigger_at(time))
    }

    fn pending_triggers(&self) -> usize {
        self.node().map_or(0, |n| n.pending_triggers())
    }

    fn is_source(&self) -> bool {
        self.node().is_some_and(|n| n.is_source())
    }

    fn reset(&mut self) {
        if let Some(node) = self.node_mut() {
            node.reset();
        }
    }
}

macro_rules! impl_from_node {
    ($($node:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$node> for Primitive {
                fn from(node: $node) -> Self {
                    Primitive::$variant(node)
                }
            }
        )*
    };
}

impl_from_node! {
    NoiseNode => Noise,
    LfoNode => Lfo,
    FilterNode => Filter,
    GainNode => Gain,
    EnvNode => Envelope,
    ReverbNode => Reverb,
    DynamicsNode => Dynamics,
}

/// Reject non-finite or out-of-range construction values.
pub(crate) fn check(name: &'static str, value: f32, valid: bool) -> Result<(), GraphError> {
    if value.is_finite() && valid {
        Ok(())
    } else {
        Err(GraphError::InvalidParameter { name, value })
    }
}
