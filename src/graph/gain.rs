use crate::{
    error::GraphError,
    graph::{
        node::{check, GraphNode, ParamBlock, RenderCtx},
        param::{Param, ParamId},
    },
};

/// Multiplies its summed input by the `Gain` parameter.
///
/// A gain whose own value is 0 and whose `Gain` is driven by LFOs becomes a
/// pure amplitude modulator: the LFO outputs add up to the multiplier.
pub struct GainNode {
    gain: f32,
}

impl GainNode {
    pub fn new(gain: f32) -> Self {
        Self { gain }
    }

    pub fn unity() -> Self {
        Self::new(1.0)
    }
}

impl GraphNode for GainNode {
    fn render_block(
        &mut self,
        input: &[f32],
        out: &mut [f32],
        params: &ParamBlock<'_>,
        _ctx: &RenderCtx,
    ) {
        for ((o, i), g) in out.iter_mut().zip(input).zip(params.get(ParamId::Gain)) {
            *o = *i * *g;
        }
    }

    fn params(&self) -> Vec<(ParamId, Param)> {
        vec![(ParamId::Gain, Param::linear(self.gain))]
    }

    fn validate(&self) -> Result<(), GraphError> {
        check("gain", self.gain, true)
    }
}
