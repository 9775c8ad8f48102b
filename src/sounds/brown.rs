use crate::{
    dsp::{
        filter::{FilterType, Rolloff},
        noise::NoiseColor,
    },
    engine::OutputBus,
    error::GraphError,
    graph::{DynamicsNode, FilterNode, GainNode, Graph, LfoNode, NodeId, NoiseNode, ParamId},
    sounds::{silence_gains, Patch, VOLUME_RAMP},
};

/*
Brown Noise
===========

Four spectral layers, each breathing on its own slow LFO so the drone never
sits still:

  brown ─→ LP  80 Hz (24 dB/oct) ─→ [gain ← LFO 0.015 Hz, 0.60..1.00] ─┐  sub
  brown ─→ LP 400 Hz             ─→ [gain ← LFO 0.030 Hz, 0.70..1.00] ─┤  body
  pink  ─→ BP 900 Hz, Q 0.7      ─→ [gain ← LFO 0.050 Hz, 0.15..0.35] ─┤  mid
  white ─→ HP 6 kHz              ─→ [gain ← LFO 0.080 Hz, 0.02..0.06] ─┤  air
                                                                       ▼
           bus ←─ limiter -1 dB ←─ compressor ←─ LP 8 kHz ←─ output gain

Layer gains have an intrinsic value of 0, so each LFO sets its layer's gain
outright. The output gain is `volume * 0.4` for headroom, since four layers
sum into it. The compressor tames build-up when the LFO peaks align and the
limiter is the last guard before the shared bus.
*/

/// Headroom for four summed layers.
pub const OUTPUT_SCALE: f32 = 0.4;

/// Fade applied when the sound is first built.
const FADE_IN: f64 = 0.3;

struct Layer {
    color: NoiseColor,
    filter: FilterType,
    frequency: f32,
    q: f32,
    rolloff: Rolloff,
    rate: f32,
    min: f32,
    max: f32,
}

const LAYERS: [Layer; 4] = [
    Layer {
        color: NoiseColor::Brown,
        filter: FilterType::LowPass,
        frequency: 80.0,
        q: 0.707,
        rolloff: Rolloff::Db24,
        rate: 0.015,
        min: 0.6,
        max: 1.0,
    },
    Layer {
        color: NoiseColor::Brown,
        filter: FilterType::LowPass,
        frequency: 400.0,
        q: 0.707,
        rolloff: Rolloff::Db12,
        rate: 0.03,
        min: 0.7,
        max: 1.0,
    },
    Layer {
        color: NoiseColor::Pink,
        filter: FilterType::BandPass,
        frequency: 900.0,
        q: 0.7,
        rolloff: Rolloff::Db12,
        rate: 0.05,
        min: 0.15,
        max: 0.35,
    },
    Layer {
        color: NoiseColor::White,
        filter: FilterType::HighPass,
        frequency: 6_000.0,
        q: 0.707,
        rolloff: Rolloff::Db12,
        rate: 0.08,
        min: 0.02,
        max: 0.06,
    },
];

pub struct BrownNoise {
    nodes: Vec<NodeId>,
    output: NodeId,
    volume: f32,
}

impl BrownNoise {
    pub fn build(graph: &mut Graph, bus: OutputBus, volume: f32) -> Result<Self, GraphError> {
        let now = graph.now();

        let (output, nodes) = Patch::build(graph, |patch| {
            let output = patch.add(GainNode::new(0.0))?;

            for (i, layer) in LAYERS.iter().enumerate() {
                let source = patch.add(NoiseNode::new(layer.color))?;
                let filter = patch.add(
                    FilterNode::new(layer.filter, layer.frequency)
                        .q(layer.q)
                        .rolloff(layer.rolloff),
                )?;
                let gain = patch.add(GainNode::new(0.0))?;
                let lfo = patch
                    .add(LfoNode::sine(layer.rate, layer.min, layer.max).phase(i as f32 * 0.25))?;

                patch.chain(&[source, filter, gain, output])?;
                patch.modulate(lfo, gain, ParamId::Gain)?;
            }

            let smoothing = patch.add(FilterNode::lowpass(8_000.0))?;
            let compressor = patch.add(DynamicsNode::compressor(-18.0, 3.0, 0.03, 0.25))?;
            let limiter = patch.add(DynamicsNode::limiter(-1.0))?;
            patch.chain(&[output, smoothing, compressor, limiter])?;
            patch.connect_bus(limiter, bus)?;

            patch
                .graph()
                .param_mut(output, ParamId::Gain)?
                .ramp_to(volume * OUTPUT_SCALE, FADE_IN, now);
            Ok(output)
        })?;

        Ok(Self {
            nodes,
            output,
            volume,
        })
    }

    pub fn set_volume(&mut self, graph: &mut Graph, volume: f32) -> Result<(), GraphError> {
        self.volume = volume;
        if volume == 0.0 {
            return silence_gains(graph, &[self.output]);
        }
        graph.ramp_param(self.output, ParamId::Gain, volume * OUTPUT_SCALE, VOLUME_RAMP)
    }

    pub fn dispose(self, graph: &mut Graph) -> usize {
        graph.dispose_all(&self.nodes)
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// The stage carrying `volume * OUTPUT_SCALE`.
    pub fn output(&self) -> NodeId {
        self.output
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}
