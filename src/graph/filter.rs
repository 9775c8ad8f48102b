use crate::{
    dsp::filter::{damping, integrator_gain, FilterType, Rolloff, SVFilter},
    error::GraphError,
    graph::{
        node::{check, GraphNode, ParamBlock, RenderCtx},
        param::{Param, ParamId},
    },
};

/*
Filter Node
===========

Shapes the colour of a noise layer. Each texture layer is "noise through a
filter", and the filter type decides which part of the spectrum survives:

  Lowpass:   sub rumble (80-120 Hz), warm body (400-600 Hz), smoothing
  Bandpass:  droplets (2.5 kHz), wave retreat and breaking (0.8-1.8 kHz)
  Highpass:  air, hiss and foam (4-7 kHz)

Frequency and Q are automatable. An LFO connected to `ParamId::Frequency`
sweeps the band, which is how the ocean's "retreat" layer drifts.

Coefficients are recomputed only when the resolved frequency or Q changes
between samples, so a static filter costs no `tan` per sample.
*/

pub struct FilterNode {
    filter_type: FilterType,
    rolloff: Rolloff,
    frequency: f32,
    q: f32,
    stages: [SVFilter; 2],
    coeffs: Coefficients,
}

#[derive(Clone, Copy)]
struct Coefficients {
    frequency: f32,
    q: f32,
    sample_rate: f32,
    g: f32,
    k: f32,
}

impl Coefficients {
    fn update(&mut self, frequency: f32, q: f32, sample_rate: f32) -> (f32, f32) {
        if frequency != self.frequency || q != self.q || sample_rate != self.sample_rate {
            self.frequency = frequency;
            self.q = q;
            self.sample_rate = sample_rate;
            self.g = integrator_gain(frequency, sample_rate);
            self.k = damping(q);
        }
        (self.g, self.k)
    }
}

impl FilterNode {
    pub fn new(filter_type: FilterType, frequency: f32) -> Self {
        Self {
            filter_type,
            rolloff: Rolloff::Db12,
            frequency,
            q: std::f32::consts::FRAC_1_SQRT_2,
            stages: [SVFilter::new(), SVFilter::new()],
            coeffs: Coefficients {
                frequency: f32::NAN,
                q: f32::NAN,
                sample_rate: f32::NAN,
                g: 0.0,
                k: 0.0,
            },
        }
    }

    pub fn lowpass(frequency: f32) -> Self {
        Self::new(FilterType::LowPass, frequency)
    }

    pub fn highpass(frequency: f32) -> Self {
        Self::new(FilterType::HighPass, frequency)
    }

    pub fn bandpass(frequency: f32) -> Self {
        Self::new(FilterType::BandPass, frequency)
    }

    pub fn q(mut self, q: f32) -> Self {
        self.q = q;
        self
    }

    pub fn rolloff(mut self, rolloff: Rolloff) -> Self {
        self.rolloff = rolloff;
        self
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }
}

impl GraphNode for FilterNode {
    fn render_block(
        &mut self,
        input: &[f32],
        out: &mut [f32],
        params: &ParamBlock<'_>,
        ctx: &RenderCtx,
    ) {
        let frequencies = params.get(ParamId::Frequency);
        let qs = params.get(ParamId::Q);
        let stages = self.rolloff.stages();

        for (i, sample) in out.iter_mut().enumerate() {
            let (g, k) = self.coeffs.update(frequencies[i], qs[i], ctx.sample_rate);
            let mut value = input[i];
            for stage in &mut self.stages[..stages] {
                value = stage.tick(value, self.filter_type, k, g);
            }
            *sample = value;
        }
    }

    fn params(&self) -> Vec<(ParamId, Param)> {
        vec![
            (ParamId::Frequency, Param::linear(self.frequency)),
            (ParamId::Q, Param::linear(self.q)),
        ]
    }

    fn validate(&self) -> Result<(), GraphError> {
        check("frequency", self.frequency, self.frequency > 0.0)?;
        check("q", self.q, self.q > 0.0)
    }

    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}
