use crate::{
    dsp::lfo::SineLfo,
    error::GraphError,
    graph::{
        node::{check, GraphNode, ParamBlock, RenderCtx},
        param::{Param, ParamId},
    },
};

/*
LFO (Low Frequency Oscillator)
==============================

An LFO is a source whose output is meant for a parameter rather than the
speakers. Connect it with `Graph::connect_param` and its output is added to
the target's automated value every sample.

  // Breathing gain: the target's own value is 0 so the LFO sets it outright
  let lfo = graph.add(LfoNode::sine(0.03, 0.7, 1.0))?;
  graph.connect_param(lfo, layer_gain, ParamId::Gain)?;

  // Drifting rate: an LFO on another LFO's Frequency
  let drift = graph.add(LfoNode::sine(0.03, -0.03, 0.03))?;
  graph.connect_param(drift, wave_lfo, ParamId::Frequency)?;

Like noise sources, LFOs stay at zero until started. See `dsp/lfo.rs` for the
range mapping and the typical ambient rates.
*/

pub struct LfoNode {
    lfo: SineLfo,
    frequency: f32,
}

impl LfoNode {
    /// Sine LFO sweeping `[min, max]` at `frequency` Hz.
    pub fn sine(frequency: f32, min: f32, max: f32) -> Self {
        Self {
            lfo: SineLfo::new(min, max),
            frequency,
        }
    }

    /// Starting phase in cycles (0.0..1.0).
    pub fn phase(mut self, phase: f32) -> Self {
        self.lfo = self.lfo.with_phase(phase);
        self
    }

    pub fn range(&self) -> (f32, f32) {
        self.lfo.range()
    }
}

impl GraphNode for LfoNode {
    fn render_block(
        &mut self,
        _input: &[f32],
        out: &mut [f32],
        params: &ParamBlock<'_>,
        ctx: &RenderCtx,
    ) {
        for (sample, frequency) in out.iter_mut().zip(params.get(ParamId::Frequency)) {
            *sample = self.lfo.next_sample(*frequency, ctx.sample_rate);
        }
    }

    fn params(&self) -> Vec<(ParamId, Param)> {
        vec![(ParamId::Frequency, Param::linear(self.frequency))]
    }

    fn validate(&self) -> Result<(), GraphError> {
        let (min, max) = self.lfo.range();
        check("frequency", self.frequency, self.frequency >= 0.0)?;
        check("min", min, true)?;
        check("max", max, max >= min)
    }

    fn is_source(&self) -> bool {
        true
    }
}
