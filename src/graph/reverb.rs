use crate::dsp::reverb::SchroederReverb;
use crate::error::GraphError;
use crate::graph::node::{check, GraphNode, ParamBlock, RenderCtx};

/*
Reverb Node
===========

Places a texture in a space. Rain uses a medium decay (about 2.5 s) so the
droplets blur into a shower; the ocean uses a long one (about 6 s) so the
waves wash into each other.

Parameters
----------

Decay (seconds):
  RT60 of the tail, the time for it to fall by 60 dB.

Damping (0.0 - 1.0):
  High-frequency absorption. 0.0 = bright, metallic    1.0 = dark, muffled

Mix (0.0 - 1.0):
  Dry/wet blend.  0.0 = all dry, 0.3 = subtle, 1.0 = all wet

Delay lines depend on the sample rate, so they are allocated in `prepare`
when the node joins a graph and again if the graph's sample rate changes.
*/

const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;

pub struct ReverbNode {
    reverb: Box<SchroederReverb>,
    decay: f32,
    damping: f32,
    mix: f32,
}

impl ReverbNode {
    pub fn new(decay: f32, mix: f32) -> Self {
        let damping = 0.4;
        let mut reverb = SchroederReverb::new(DEFAULT_SAMPLE_RATE, decay.max(0.01));
        reverb.set_damping(damping);
        Self {
            reverb: Box::new(reverb),
            decay,
            damping,
            mix,
        }
    }

    pub fn damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self.reverb.set_damping(damping);
        self
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn mix(&self) -> f32 {
        self.mix
    }
}

impl GraphNode for ReverbNode {
    fn render_block(
        &mut self,
        input: &[f32],
        out: &mut [f32],
        _params: &ParamBlock<'_>,
        _ctx: &RenderCtx,
    ) {
        let dry = 1.0 - self.mix;
        for (o, i) in out.iter_mut().zip(input) {
            let wet = self.reverb.process(*i);
            *o = *i * dry + wet * self.mix;
        }
    }

    fn validate(&self) -> Result<(), GraphError> {
        check("decay", self.decay, self.decay > 0.0)?;
        check("damping", self.damping, (0.0..=1.0).contains(&self.damping))?;
        check("mix", self.mix, (0.0..=1.0).contains(&self.mix))
    }

    fn prepare(&mut self, sample_rate: f32) {
        let mut reverb = SchroederReverb::new(sample_rate, self.decay);
        reverb.set_damping(self.damping);
        self.reverb = Box::new(reverb);
    }

    fn reset(&mut self) {
        self.reverb.reset();
    }
}
