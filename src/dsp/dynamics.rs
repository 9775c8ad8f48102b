//! Feed-forward compressor and limiter.
//!
//! Level detection runs in the decibel domain with separate attack and
//! release smoothing. Above the threshold the gain computer applies
//! `over * (1 - 1/ratio)` dB of reduction. The limiter is the same detector
//! with a very high ratio and millisecond timing, followed by a hard ceiling
//! so nothing escapes the threshold while the detector is still catching up.

use super::flush_denormal;

const FLOOR_DB: f32 = -120.0;

#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    if gain <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * gain.log10()
    }
}

#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    if db == f32::NEG_INFINITY {
        0.0
    } else {
        10f32.powf(db / 20.0)
    }
}

fn smoothing_coefficient(seconds: f32, sample_rate: f32) -> f32 {
    (-1.0 / (seconds.max(1e-4) * sample_rate)).exp()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicsSettings {
    pub threshold_db: f32,
    pub ratio: f32,
    pub attack: f32,
    pub release: f32,
    /// Hard output ceiling at the threshold.
    pub ceiling: bool,
}

impl DynamicsSettings {
    pub fn compressor(threshold_db: f32, ratio: f32, attack: f32, release: f32) -> Self {
        Self {
            threshold_db,
            ratio,
            attack,
            release,
            ceiling: false,
        }
    }

    pub fn limiter(threshold_db: f32) -> Self {
        Self {
            threshold_db,
            ratio: 20.0,
            attack: 0.003,
            release: 0.05,
            ceiling: true,
        }
    }
}

pub struct DynamicsProcessor {
    settings: DynamicsSettings,
    envelope_db: f32,
}

impl DynamicsProcessor {
    pub fn new(settings: DynamicsSettings) -> Self {
        Self {
            settings,
            envelope_db: FLOOR_DB,
        }
    }

    pub fn settings(&self) -> &DynamicsSettings {
        &self.settings
    }

    /// Current gain reduction in dB (positive number).
    pub fn reduction_db(&self) -> f32 {
        let over = self.envelope_db - self.settings.threshold_db;
        if over > 0.0 {
            over * (1.0 - 1.0 / self.settings.ratio)
        } else {
            0.0
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        let attack = smoothing_coefficient(self.settings.attack, sample_rate);
        let release = smoothing_coefficient(self.settings.release, sample_rate);
        let ceiling = db_to_gain(self.settings.threshold_db);

        for sample in buffer.iter_mut() {
            let level_db = gain_to_db(sample.abs()).max(FLOOR_DB);
            let coeff = if level_db > self.envelope_db { attack } else { release };
            self.envelope_db = level_db + coeff * (self.envelope_db - level_db);

            *sample = flush_denormal(*sample * db_to_gain(-self.reduction_db()));

            if self.settings.ceiling {
                *sample = sample.clamp(-ceiling, ceiling);
            }
        }
    }

    pub fn reset(&mut self) {
        self.envelope_db = FLOOR_DB;
    }
}
