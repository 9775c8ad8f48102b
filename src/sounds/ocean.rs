use crate::{
    dsp::{
        filter::{FilterType, Rolloff},
        noise::NoiseColor,
    },
    engine::OutputBus,
    error::GraphError,
    graph::{FilterNode, GainNode, Graph, LfoNode, NodeId, NoiseNode, ParamId, ReverbNode},
    sounds::{silence_gains, Patch, VOLUME_RAMP},
};

/*
Ocean Waves
===========

Seven layers sum into one wave stage whose gain is set entirely by two LFOs.
A third, very slow LFO nudges the rate of both wave LFOs, so the swell never
settles into a regular pulse:

  rumble   brown ─→ LP 120 Hz (24 dB/oct) ──────────────────────────┐
  body     pink  ─→ LP 600 Hz ──────────────────────────────────────┤
  hiss     white ─→ HP 4 kHz ───────────────────────────────────────┤
  retreat  pink  ─→ BP 800 Hz (freq ← LFO 0.07) ─→ [gain ← LFO 0.09] ┤
  breaking white ─→ BP 1.8 kHz ─────────────────→ [gain ← LFO 0.11] ┤
  foam     white ─→ HP 7 kHz ───────────────────────────────────────┤
  splash   white ─→ BP 3 kHz ───────────────────→ [gain ← LFO 0.19] ┤
                                                                    ▼
                        random LFO 0.03 Hz ──→ freq of ──→ wave LFOs ──→ [wave gain]
                                                                    │
              bus ←── master gain ←── reverb 6 s ←── output gain ←──┘

Fade choreography
-----------------

Everything is built silent: each source level at -inf dB and the output and
master gains at 0. Starting 200 ms after construction every layer ramps to
its own target over its own duration (2.5 to 3.4 s), so the sea rolls in
unevenly rather than as one swell. Output and master fade alongside.

Muting cancels all of that and snaps every level to silence. Unmuting brings
each layer back to its target over 100 ms; the slow roll-in only happens once.
*/

/// Delay before the roll-in starts.
pub const FADE_DELAY: f64 = 0.2;
const OUTPUT_FADE: f64 = 2.5;
const MASTER_FADE: f64 = 3.0;

struct Layer {
    color: NoiseColor,
    filter: FilterType,
    frequency: f32,
    q: f32,
    rolloff: Rolloff,
    level_db: f32,
    fade: f64,
    /// Gain LFO (rate, min, max) on a dedicated layer gain.
    gain_lfo: Option<(f32, f32, f32)>,
    /// Frequency LFO (rate, offset min, offset max), added to `frequency`.
    sweep_lfo: Option<(f32, f32, f32)>,
}

const LAYERS: [Layer; 7] = [
    // rumble
    Layer {
        color: NoiseColor::Brown,
        filter: FilterType::LowPass,
        frequency: 120.0,
        q: 0.707,
        rolloff: Rolloff::Db24,
        level_db: -8.0,
        fade: 2.5,
        gain_lfo: None,
        sweep_lfo: None,
    },
    // body
    Layer {
        color: NoiseColor::Pink,
        filter: FilterType::LowPass,
        frequency: 600.0,
        q: 0.707,
        rolloff: Rolloff::Db12,
        level_db: -10.0,
        fade: 2.8,
        gain_lfo: None,
        sweep_lfo: None,
    },
    // hiss
    Layer {
        color: NoiseColor::White,
        filter: FilterType::HighPass,
        frequency: 4_000.0,
        q: 0.707,
        rolloff: Rolloff::Db12,
        level_db: -28.0,
        fade: 3.0,
        gain_lfo: None,
        sweep_lfo: None,
    },
    // retreat: 800 Hz swept over 400..1400
    Layer {
        color: NoiseColor::Pink,
        filter: FilterType::BandPass,
        frequency: 800.0,
        q: 1.2,
        rolloff: Rolloff::Db12,
        level_db: -14.0,
        fade: 3.2,
        gain_lfo: Some((0.09, 0.2, 0.8)),
        sweep_lfo: Some((0.07, -400.0, 600.0)),
    },
    // breaking
    Layer {
        color: NoiseColor::White,
        filter: FilterType::BandPass,
        frequency: 1_800.0,
        q: 0.8,
        rolloff: Rolloff::Db12,
        level_db: -18.0,
        fade: 2.6,
        gain_lfo: Some((0.11, 0.1, 0.9)),
        sweep_lfo: None,
    },
    // foam
    Layer {
        color: NoiseColor::White,
        filter: FilterType::HighPass,
        frequency: 7_000.0,
        q: 0.707,
        rolloff: Rolloff::Db12,
        level_db: -32.0,
        fade: 3.4,
        gain_lfo: None,
        sweep_lfo: None,
    },
    // splash
    Layer {
        color: NoiseColor::White,
        filter: FilterType::BandPass,
        frequency: 3_000.0,
        q: 2.0,
        rolloff: Rolloff::Db12,
        level_db: -24.0,
        fade: 2.9,
        gain_lfo: Some((0.19, 0.0, 0.5)),
        sweep_lfo: None,
    },
];

pub struct OceanWaves {
    nodes: Vec<NodeId>,
    /// Each source with its target level in dB.
    sources: Vec<(NodeId, f32)>,
    output: NodeId,
    master: NodeId,
    volume: f32,
    muted: bool,
}

impl OceanWaves {
    pub fn build(graph: &mut Graph, bus: OutputBus, volume: f32) -> Result<Self, GraphError> {
        let start = graph.now() + FADE_DELAY;

        let ((sources, output, master), nodes) = Patch::build(graph, |patch| {
            let wave = patch.add(GainNode::new(0.0))?;
            let output = patch.add(GainNode::new(0.0))?;
            let reverb = patch.add(ReverbNode::new(6.0, 0.35))?;
            let master = patch.add(GainNode::new(0.0))?;

            let mut sources = Vec::with_capacity(LAYERS.len());
            for (i, layer) in LAYERS.iter().enumerate() {
                let source = patch.add(NoiseNode::new(layer.color).level(f32::NEG_INFINITY))?;
                let filter = patch.add(
                    FilterNode::new(layer.filter, layer.frequency)
                        .q(layer.q)
                        .rolloff(layer.rolloff),
                )?;
                patch.connect(source, filter)?;

                if let Some((rate, min, max)) = layer.sweep_lfo {
                    let sweep = patch.add(LfoNode::sine(rate, min, max))?;
                    patch.modulate(sweep, filter, ParamId::Frequency)?;
                }

                match layer.gain_lfo {
                    Some((rate, min, max)) => {
                        let gain = patch.add(GainNode::new(0.0))?;
                        let lfo = patch.add(LfoNode::sine(rate, min, max).phase(i as f32 / 7.0))?;
                        patch.modulate(lfo, gain, ParamId::Gain)?;
                        patch.chain(&[filter, gain, wave])?;
                    }
                    None => patch.connect(filter, wave)?,
                }

                let level = patch.graph().param_mut(source, ParamId::Level)?;
                level.set_value_at(f32::NEG_INFINITY, start);
                level.linear_ramp_to_value_at(layer.level_db, start + layer.fade);
                sources.push((source, layer.level_db));
            }

            let wave_lfo_1 = patch.add(LfoNode::sine(0.08, 0.25, 0.55))?;
            let wave_lfo_2 = patch.add(LfoNode::sine(0.13, 0.1, 0.35).phase(0.5))?;
            let drift = patch.add(LfoNode::sine(0.03, -0.03, 0.03))?;
            patch.modulate(wave_lfo_1, wave, ParamId::Gain)?;
            patch.modulate(wave_lfo_2, wave, ParamId::Gain)?;
            patch.modulate(drift, wave_lfo_1, ParamId::Frequency)?;
            patch.modulate(drift, wave_lfo_2, ParamId::Frequency)?;

            patch.chain(&[wave, output, reverb, master])?;
            patch.connect_bus(master, bus)?;

            let graph = patch.graph();
            let gain = graph.param_mut(output, ParamId::Gain)?;
            gain.set_value_at(0.0, start);
            gain.linear_ramp_to_value_at(1.0, start + OUTPUT_FADE);
            let gain = graph.param_mut(master, ParamId::Gain)?;
            gain.set_value_at(0.0, start);
            gain.linear_ramp_to_value_at(volume, start + MASTER_FADE);

            Ok((sources, output, master))
        })?;

        Ok(Self {
            nodes,
            sources,
            output,
            master,
            volume,
            muted: volume == 0.0,
        })
    }

    pub fn set_volume(&mut self, graph: &mut Graph, volume: f32) -> Result<(), GraphError> {
        self.volume = volume;

        if volume == 0.0 {
            for &(source, _) in &self.sources {
                graph.set_param(source, ParamId::Level, f32::NEG_INFINITY)?;
            }
            silence_gains(graph, &[self.output, self.master])?;
            self.muted = true;
            return Ok(());
        }

        if self.muted {
            for &(source, level_db) in &self.sources {
                graph.ramp_param(source, ParamId::Level, level_db, VOLUME_RAMP)?;
            }
            graph.ramp_param(self.output, ParamId::Gain, 1.0, VOLUME_RAMP)?;
            self.muted = false;
        }
        graph.ramp_param(self.master, ParamId::Gain, volume, VOLUME_RAMP)
    }

    pub fn dispose(self, graph: &mut Graph) -> usize {
        graph.dispose_all(&self.nodes)
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn sources(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.sources.iter().map(|(id, _)| *id)
    }

    pub fn output(&self) -> NodeId {
        self.output
    }

    pub fn master(&self) -> NodeId {
        self.master
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}
