use tracing::warn;

use crate::{
    engine::OutputBus,
    error::GraphError,
    graph::{
        EnvNode, FilterNode, GainNode, Graph, NodeId, NoiseNode, ParamId, RetriggerTask,
        ReverbNode, TaskId,
    },
    sounds::{silence_gains, Patch, VOLUME_RAMP},
};

/*
Rain
====

  white ─→ BP 2.5 kHz, Q 1.5 ─→ [envelope ← retrigger task] ─→ drop gain ──┐
                                                                          ├─→ reverb 2.5 s ─→ bus
  pink  ─→ LP 1.8 kHz ───────────────────────────────────→ ambient gain ──┘

Each droplet is one short envelope burst (10 ms attack, 80 ms decay, no
sustain) on band-passed white noise. The retrigger task fires the envelope
at random intervals between 50 and 300 ms, keeping a rolling 60 second
window of drops queued ahead of the clock. Underneath, a continuous pink wash
gives the shower its body.

Both gains start at zero and fade to their level over `FADE_IN`, so the
wash does not step in when rain starts.

Disposing the sound cancels the retrigger task before releasing the nodes,
so no drop is scheduled for a sound that no longer exists.
*/

pub const DROP_SCALE: f32 = 0.8;
pub const AMBIENT_SCALE: f32 = 0.3;

/// Fade applied when the sound is first built.
pub const FADE_IN: f64 = 0.3;

pub struct Rain {
    nodes: Vec<NodeId>,
    envelope: NodeId,
    drop_gain: NodeId,
    ambient_gain: NodeId,
    schedule: Option<TaskId>,
    volume: f32,
}

impl Rain {
    pub fn build(graph: &mut Graph, bus: OutputBus, volume: f32) -> Result<Self, GraphError> {
        Self::build_with(graph, bus, volume, |task| task)
    }

    /// Build with a customised drop schedule (seeded, shorter lookahead).
    pub fn build_with(
        graph: &mut Graph,
        bus: OutputBus,
        volume: f32,
        tune: impl FnOnce(RetriggerTask) -> RetriggerTask,
    ) -> Result<Self, GraphError> {
        let now = graph.now();

        let ((envelope, drop_gain, ambient_gain, schedule), nodes) =
            Patch::build(graph, |patch| {
                let drops = patch.add(NoiseNode::white())?;
                let band = patch.add(FilterNode::bandpass(2_500.0).q(1.5))?;
                let envelope = patch.add(EnvNode::percussive(0.01, 0.08))?;
                let drop_gain = patch.add(GainNode::new(0.0))?;

                let wash = patch.add(NoiseNode::pink())?;
                let wash_filter = patch.add(FilterNode::lowpass(1_800.0))?;
                let ambient_gain = patch.add(GainNode::new(0.0))?;

                let reverb = patch.add(ReverbNode::new(2.5, 0.3))?;

                patch.chain(&[drops, band, envelope, drop_gain, reverb])?;
                patch.chain(&[wash, wash_filter, ambient_gain, reverb])?;
                patch.connect_bus(reverb, bus)?;

                for (gain, scale) in [(drop_gain, DROP_SCALE), (ambient_gain, AMBIENT_SCALE)] {
                    patch
                        .graph()
                        .param_mut(gain, ParamId::Gain)?
                        .ramp_to(volume * scale, FADE_IN, now);
                }

                let schedule = patch
                    .graph()
                    .schedule(tune(RetriggerTask::new(envelope, now)))?;
                Ok((envelope, drop_gain, ambient_gain, schedule))
            })?;

        Ok(Self {
            nodes,
            envelope,
            drop_gain,
            ambient_gain,
            schedule: Some(schedule),
            volume,
        })
    }

    pub fn set_volume(&mut self, graph: &mut Graph, volume: f32) -> Result<(), GraphError> {
        self.volume = volume;
        if volume == 0.0 {
            return silence_gains(graph, &[self.drop_gain, self.ambient_gain]);
        }
        graph.ramp_param(self.drop_gain, ParamId::Gain, volume * DROP_SCALE, VOLUME_RAMP)?;
        graph.ramp_param(
            self.ambient_gain,
            ParamId::Gain,
            volume * AMBIENT_SCALE,
            VOLUME_RAMP,
        )
    }

    pub fn dispose(mut self, graph: &mut Graph) -> usize {
        let mut failures = 0;
        if let Some(task) = self.schedule.take() {
            if !graph.cancel_task(task) {
                warn!("rain schedule was already gone");
                failures += 1;
            }
        }
        failures + graph.dispose_all(&self.nodes)
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// The envelope the drops fire.
    pub fn envelope(&self) -> NodeId {
        self.envelope
    }

    pub fn schedule(&self) -> Option<TaskId> {
        self.schedule
    }

    pub fn gains(&self) -> [NodeId; 2] {
        [self.drop_gain, self.ambient_gain]
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}
