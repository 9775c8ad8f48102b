//! Low frequency oscillator math.

use std::f32::consts::TAU;

/*
Slow Modulators
===============

Ambient textures use LFOs far below the usual vibrato range:

    0.01 - 0.1 Hz   "breathing" layer gains (10 - 100 s per cycle)
    0.05 - 0.2 Hz   wave cadence, filter sweeps
    0.2 - 1 Hz      quick surf / splash movement

Output is mapped from the bipolar sine (-1..+1) into an explicit [min, max]
range so an LFO can drive a parameter directly:

    value = min + (max - min) * (sin + 1) / 2

Phase is accumulated per sample from the instantaneous frequency, which lets
another LFO modulate the frequency without discontinuities (FM at control
rate). Negative instantaneous frequencies are treated as a stopped phase.
*/

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}

/// Map a unipolar value into `[min, max]`.
#[inline]
pub fn scale_to_range(unipolar: f32, min: f32, max: f32) -> f32 {
    min + (max - min) * unipolar
}

pub struct SineLfo {
    phase: f32, // 0.0..1.0
    min: f32,
    max: f32,
}

impl SineLfo {
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            phase: 0.0,
            min,
            max,
        }
    }

    /// Start at a given phase (0.0..1.0) so parallel LFOs do not move in lockstep.
    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase.rem_euclid(1.0);
        self
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let value = scale_to_range(
            bipolar_to_unipolar((TAU * self.phase).sin()),
            self.min,
            self.max,
        );
        self.phase = (self.phase + frequency.max(0.0) / sample_rate).fract();
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bipolar_maps_to_unit_range() {
        assert!((bipolar_to_unipolar(-1.0) - 0.0).abs() < 1e-6);
        assert!((bipolar_to_unipolar(0.0) - 0.5).abs() < 1e-6);
        assert!((bipolar_to_unipolar(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn output_stays_inside_range() {
        let mut lfo = SineLfo::new(0.2, 0.8);
        for _ in 0..48_000 {
            let v = lfo.next_sample(5.0, 48_000.0);
            assert!((0.2 - 1e-5..=0.8 + 1e-5).contains(&v), "value {v}");
        }
    }

    #[test]
    fn one_period_returns_to_start() {
        let mut lfo = SineLfo::new(-1.0, 1.0);
        let first = lfo.next_sample(10.0, 1_000.0);
        for _ in 0..99 {
            lfo.next_sample(10.0, 1_000.0);
        }
        let again = lfo.next_sample(10.0, 1_000.0);
        assert!((first - again).abs() < 1e-3);
    }

    #[test]
    fn negative_frequency_holds_phase() {
        let mut lfo = SineLfo::new(0.0, 1.0).with_phase(0.25);
        let a = lfo.next_sample(-3.0, 1_000.0);
        let b = lfo.next_sample(-3.0, 1_000.0);
        assert_eq!(a, b);
    }
}
