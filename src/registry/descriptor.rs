use crate::{
    engine::OutputBus,
    error::GraphError,
    graph::Graph,
    sounds::{BrownNoise, OceanWaves, Rain, SoundNode},
};

/// Builds a sound into the graph at an initial (post-multiplier) volume.
pub type Recipe = fn(&mut Graph, OutputBus, f32) -> Result<SoundNode, GraphError>;

/// Static configuration of one sound kind.
#[derive(Debug, Clone, Copy)]
pub struct SoundDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    /// Icon name for the UI layer.
    pub icon: &'static str,
    pub min_volume: f32,
    pub max_volume: f32,
    pub default_volume: f32,
    /// Loudness compensation applied to every volume handed to the sound.
    pub volume_multiplier: f32,
    pub build: Recipe,
}

impl SoundDescriptor {
    /// Clamp into `[min_volume, max_volume]`. NaN maps to the minimum.
    pub fn clamp(&self, volume: f32) -> f32 {
        if volume.is_nan() {
            self.min_volume
        } else {
            volume.clamp(self.min_volume, self.max_volume)
        }
    }

    /// Volume as the sound node sees it.
    pub fn scaled(&self, volume: f32) -> f32 {
        volume * self.volume_multiplier
    }
}

fn brown_noise(graph: &mut Graph, bus: OutputBus, volume: f32) -> Result<SoundNode, GraphError> {
    BrownNoise::build(graph, bus, volume).map(SoundNode::from)
}

fn rain(graph: &mut Graph, bus: OutputBus, volume: f32) -> Result<SoundNode, GraphError> {
    Rain::build(graph, bus, volume).map(SoundNode::from)
}

fn ocean_waves(graph: &mut Graph, bus: OutputBus, volume: f32) -> Result<SoundNode, GraphError> {
    OceanWaves::build(graph, bus, volume).map(SoundNode::from)
}

pub const BROWN_NOISE: SoundDescriptor = SoundDescriptor {
    key: "brownNoise",
    label: "Brown Noise",
    icon: "wind",
    min_volume: 0.0,
    max_volume: 1.0,
    default_volume: 0.5,
    volume_multiplier: 1.0,
    build: brown_noise,
};

pub const RAIN: SoundDescriptor = SoundDescriptor {
    key: "rain",
    label: "Rain",
    icon: "cloud-rain",
    min_volume: 0.0,
    max_volume: 1.0,
    default_volume: 0.5,
    volume_multiplier: 0.8,
    build: rain,
};

pub const OCEAN_WAVES: SoundDescriptor = SoundDescriptor {
    key: "oceanWaves",
    label: "Ocean Waves",
    icon: "waves",
    min_volume: 0.0,
    max_volume: 1.0,
    default_volume: 0.6,
    volume_multiplier: 1.2,
    build: ocean_waves,
};

/// The built-in sounds in display order.
pub fn builtin() -> Vec<SoundDescriptor> {
    vec![BROWN_NOISE, RAIN, OCEAN_WAVES]
}
