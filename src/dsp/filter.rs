use std::f32::consts::PI;

use super::flush_denormal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| type      | output tap      | passes          | rejects      |
| --------- | --------------- | --------------- | ------------ |
| low-pass  | v2              | below cutoff    | above cutoff |
| high-pass | x - k*v1 - v2   | above cutoff    | below cutoff |
| band-pass | v1              | around cutoff   | both sides   |

Q sets the damping of the two integrators: k = 1 / Q. A Q of ~0.707 is the
flat Butterworth response; higher values ring at the cutoff.

Steeper slopes are built by cascading identical stages: each stage adds
12 dB/octave, so two stages give the 24 dB/octave "steep" low-pass used for
sub-bass layers.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
}

/// Slope of a filter: number of cascaded 12 dB/octave stages.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rolloff {
    Db12,
    Db24,
}

impl Rolloff {
    pub fn stages(self) -> usize {
        match self {
            Rolloff::Db12 => 1,
            Rolloff::Db24 => 2,
        }
    }
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
}

/// Topology-preserving state-variable filter (one 12 dB/octave stage).
pub struct SVFilter {
    ic1eq: f32,
    ic2eq: f32,
}

/// Integrator gain for a cutoff at the given sample rate.
///
/// The cutoff is kept below Nyquist so `tan` stays finite.
#[inline]
pub fn integrator_gain(cutoff_hz: f32, sample_rate: f32) -> f32 {
    let cutoff = cutoff_hz.clamp(10.0, sample_rate * 0.49);
    (PI * cutoff / sample_rate).tan()
}

/// Damping term from a Q factor.
#[inline]
pub fn damping(q: f32) -> f32 {
    1.0 / q.max(0.05)
}

impl SVFilter {
    pub fn new() -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
        }
    }

    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = flush_denormal(2.0 * v1 - self.ic1eq);
        self.ic2eq = flush_denormal(2.0 * v2 - self.ic2eq);

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
        }
    }

    #[inline]
    pub fn tick(&mut self, sample: f32, filter_type: FilterType, k: f32, g: f32) -> f32 {
        let outputs = self.next_sample(sample, k, g);
        match filter_type {
            FilterType::LowPass => outputs.lowpass,
            FilterType::HighPass => outputs.highpass,
            FilterType::BandPass => outputs.bandpass,
        }
    }

    /// Filter a whole buffer with fixed coefficients.
    pub fn render(
        &mut self,
        buffer: &mut [f32],
        filter_type: FilterType,
        cutoff_hz: f32,
        q: f32,
        sample_rate: f32,
    ) {
        let g = integrator_gain(cutoff_hz, sample_rate);
        let k = damping(q);

        for sample in buffer.iter_mut() {
            *sample = self.tick(*sample, filter_type, k, g);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}

impl Default for SVFilter {
    fn default() -> Self {
        Self::new()
    }
}
