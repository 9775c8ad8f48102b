//! Coloured noise generators.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Noise Colours
=============

  white   Equal energy per Hz. Bright hiss.
  pink    Energy falls 3 dB/octave (equal energy per octave). Softer, "rain".
  brown   Energy falls 6 dB/octave (integrated white noise). Deep rumble, surf.

        dB
         │ white ─────────────────────────
         │ pink  ────────╲───────────
         │ brown ──────╲──────╲
         └───────────────────────────→ log f

Pink uses Paul Kellett's economy filter bank (three one-pole stages summed).
Brown is a leaky integrator over white noise; the leak keeps the random walk
from drifting into a DC offset. Both are scaled so their peak level is close
to the white source.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseColor {
    White,
    Pink,
    Brown,
}

pub struct NoiseGenerator {
    color: NoiseColor,
    rng: fastrand::Rng,
    pink: [f32; 3],
    brown: f32,
}

impl NoiseGenerator {
    pub fn new(color: NoiseColor) -> Self {
        Self::with_rng(color, fastrand::Rng::new())
    }

    /// Deterministic generator, used by tests and offline renders.
    pub fn seeded(color: NoiseColor, seed: u64) -> Self {
        Self::with_rng(color, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(color: NoiseColor, rng: fastrand::Rng) -> Self {
        Self {
            color,
            rng,
            pink: [0.0; 3],
            brown: 0.0,
        }
    }

    pub fn color(&self) -> NoiseColor {
        self.color
    }

    #[inline]
    fn white(&mut self) -> f32 {
        self.rng.f32() * 2.0 - 1.0
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let white = self.white();
        match self.color {
            NoiseColor::White => white,
            NoiseColor::Pink => {
                let [b0, b1, b2] = &mut self.pink;
                *b0 = 0.99765 * *b0 + white * 0.0990460;
                *b1 = 0.96300 * *b1 + white * 0.2965164;
                *b2 = 0.57000 * *b2 + white * 1.0526913;
                (*b0 + *b1 + *b2 + white * 0.1848) * 0.25
            }
            NoiseColor::Brown => {
                self.brown = (self.brown + 0.02 * white) / 1.02;
                self.brown * 3.5
            }
        }
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::{num_complex::Complex, FftPlanner};

    const LEN: usize = 8192;

    /// Energy in the lowest and highest eighth of the spectrum.
    fn band_energy(color: NoiseColor) -> (f32, f32) {
        let mut noise = NoiseGenerator::seeded(color, 7);
        let mut samples = vec![0.0f32; LEN];
        noise.render(&mut samples);

        let mut spectrum: Vec<Complex<f32>> =
            samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
        FftPlanner::new().plan_fft_forward(LEN).process(&mut spectrum);

        let half = LEN / 2;
        let eighth = half / 8;
        let low: f32 = spectrum[1..eighth].iter().map(|c| c.norm_sqr()).sum();
        let high: f32 = spectrum[half - eighth..half].iter().map(|c| c.norm_sqr()).sum();
        (low, high)
    }

    #[test]
    fn white_noise_stays_in_range() {
        let mut noise = NoiseGenerator::seeded(NoiseColor::White, 1);
        let mut buffer = vec![0.0; 4096];
        noise.render(&mut buffer);

        assert!(buffer.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(buffer.iter().any(|s| s.abs() > 0.5));
    }

    #[test]
    fn white_noise_is_spectrally_flat() {
        let (low, high) = band_energy(NoiseColor::White);
        let ratio = low / high;
        assert!((0.5..2.0).contains(&ratio), "ratio {ratio}");
    }

    #[test]
    fn pink_and_brown_tilt_towards_low_frequencies() {
        let (pink_low, pink_high) = band_energy(NoiseColor::Pink);
        let (brown_low, brown_high) = band_energy(NoiseColor::Brown);

        assert!(pink_low > pink_high * 4.0);
        assert!(brown_low / brown_high > pink_low / pink_high);
    }

    #[test]
    fn seeded_generators_repeat() {
        let mut a = NoiseGenerator::seeded(NoiseColor::Brown, 42);
        let mut b = NoiseGenerator::seeded(NoiseColor::Brown, 42);
        for _ in 0..64 {
            assert_eq!(a.next_sample(), b.next_sample());
        }
    }

    #[test]
    fn brown_noise_has_no_dc_drift() {
        let mut noise = NoiseGenerator::seeded(NoiseColor::Brown, 3);
        let mut buffer = vec![0.0; 48_000];
        noise.render(&mut buffer);

        let mean = buffer.iter().sum::<f32>() / buffer.len() as f32;
        assert!(mean.abs() < 0.2, "mean {mean}");
        assert!(buffer.iter().all(|s| s.is_finite() && s.abs() < 2.0));
    }
}
