use std::collections::VecDeque;

use crate::{
    dsp::envelope::{Envelope, EnvelopeState},
    error::GraphError,
    graph::node::{check, GraphNode, ParamBlock, RenderCtx},
};

/// Upper bound on queued triggers; sized so a full lookahead window of the
/// densest retrigger task fits without reallocating on the audio thread.
pub const MAX_PENDING_TRIGGERS: usize = 4096;

/// Gates its input with an envelope fired at scheduled clock times.
///
/// Triggers are absolute times on the graph clock. Each one restarts the
/// attack from the current level at the exact sample it falls on.
pub struct EnvNode {
    env: Envelope,
    attack: f32,
    decay: f32,
    triggers: VecDeque<f64>,
}

impl EnvNode {
    /// Attack then decay to silence.
    pub fn percussive(attack: f32, decay: f32) -> Self {
        Self {
            env: Envelope::percussive(attack, decay),
            attack,
            decay,
            triggers: VecDeque::with_capacity(MAX_PENDING_TRIGGERS),
        }
    }

    pub fn state(&self) -> EnvelopeState {
        self.env.state()
    }

    pub fn level(&self) -> f32 {
        self.env.level()
    }
}

impl GraphNode for EnvNode {
    fn render_block(
        &mut self,
        input: &[f32],
        out: &mut [f32],
        _params: &ParamBlock<'_>,
        ctx: &RenderCtx,
    ) {
        for (i, sample) in out.iter_mut().enumerate() {
            let now = ctx.time_at(i);
            while self.triggers.front().is_some_and(|&at| at <= now) {
                self.triggers.pop_front();
                self.env.note_on();
            }
            *sample = input[i] * self.env.next_sample(ctx.sample_rate);
        }
    }

    fn validate(&self) -> Result<(), GraphError> {
        check("attack", self.attack, self.attack >= 0.0)?;
        check("decay", self.decay, self.decay >= 0.0)
    }

    fn trigger_at(&mut self, time: f64) -> bool {
        if self.triggers.len() >= MAX_PENDING_TRIGGERS {
            return false;
        }
        let at = self.triggers.partition_point(|&queued| queued <= time);
        self.triggers.insert(at, time);
        true
    }

    fn pending_triggers(&self) -> usize {
        self.triggers.len()
    }

    fn reset(&mut self) {
        self.env.reset();
    }
}
