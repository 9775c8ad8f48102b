use crate::{
    dsp::{
        dynamics::db_to_gain,
        noise::{NoiseColor, NoiseGenerator},
    },
    error::GraphError,
    graph::{
        node::{check, GraphNode, ParamBlock, RenderCtx},
        param::{Param, ParamId},
    },
};

/*
Noise Source
============

The raw material of every texture in this crate. A noise node plays forever
once started; its loudness is the `Level` parameter in decibels so fades can
be written the way a mixing desk reads:

      0 dB   full scale
    -10 dB   about a third of full amplitude
   -inf dB   silent

Sources begin stopped and produce zeros until the graph starts them, so a
patch can be wired completely before anything is heard.
*/

pub struct NoiseNode {
    generator: NoiseGenerator,
    level_db: f32,
}

impl NoiseNode {
    pub fn new(color: NoiseColor) -> Self {
        Self {
            generator: NoiseGenerator::new(color),
            level_db: 0.0,
        }
    }

    pub fn white() -> Self {
        Self::new(NoiseColor::White)
    }

    pub fn pink() -> Self {
        Self::new(NoiseColor::Pink)
    }

    pub fn brown() -> Self {
        Self::new(NoiseColor::Brown)
    }

    /// Deterministic output, for tests and offline renders.
    pub fn seeded(color: NoiseColor, seed: u64) -> Self {
        Self {
            generator: NoiseGenerator::seeded(color, seed),
            level_db: 0.0,
        }
    }

    /// Initial level in dB. `f32::NEG_INFINITY` starts silent.
    pub fn level(mut self, level_db: f32) -> Self {
        self.level_db = level_db;
        self
    }

    pub fn color(&self) -> NoiseColor {
        self.generator.color()
    }
}

impl GraphNode for NoiseNode {
    fn render_block(
        &mut self,
        _input: &[f32],
        out: &mut [f32],
        params: &ParamBlock<'_>,
        _ctx: &RenderCtx,
    ) {
        self.generator.render(out);
        for (sample, level) in out.iter_mut().zip(params.get(ParamId::Level)) {
            *sample *= db_to_gain(*level);
        }
    }

    fn params(&self) -> Vec<(ParamId, Param)> {
        vec![(ParamId::Level, Param::decibels(self.level_db))]
    }

    fn validate(&self) -> Result<(), GraphError> {
        if self.level_db == f32::NEG_INFINITY {
            return Ok(());
        }
        check("level", self.level_db, self.level_db <= 24.0)
    }

    fn is_source(&self) -> bool {
        true
    }
}
