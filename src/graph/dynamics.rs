use crate::{
    dsp::dynamics::{DynamicsProcessor, DynamicsSettings},
    error::GraphError,
    graph::node::{check, GraphNode, ParamBlock, RenderCtx},
};

/// Compressor or limiter stage on a mix bus.
pub struct DynamicsNode {
    processor: DynamicsProcessor,
}

impl DynamicsNode {
    pub fn compressor(threshold_db: f32, ratio: f32, attack: f32, release: f32) -> Self {
        Self {
            processor: DynamicsProcessor::new(DynamicsSettings::compressor(
                threshold_db,
                ratio,
                attack,
                release,
            )),
        }
    }

    /// Brick-wall style limiter with its ceiling at `threshold_db`.
    pub fn limiter(threshold_db: f32) -> Self {
        Self {
            processor: DynamicsProcessor::new(DynamicsSettings::limiter(threshold_db)),
        }
    }

    pub fn is_limiter(&self) -> bool {
        self.processor.settings().ceiling
    }

    pub fn reduction_db(&self) -> f32 {
        self.processor.reduction_db()
    }
}

impl GraphNode for DynamicsNode {
    fn render_block(
        &mut self,
        input: &[f32],
        out: &mut [f32],
        _params: &ParamBlock<'_>,
        ctx: &RenderCtx,
    ) {
        out.copy_from_slice(&input[..out.len()]);
        self.processor.render(out, ctx.sample_rate);
    }

    fn validate(&self) -> Result<(), GraphError> {
        let s = self.processor.settings();
        check("threshold", s.threshold_db, s.threshold_db <= 0.0)?;
        check("ratio", s.ratio, s.ratio >= 1.0)?;
        check("attack", s.attack, s.attack >= 0.0)?;
        check("release", s.release, s.release >= 0.0)
    }

    fn reset(&mut self) {
        self.processor.reset();
    }
}
