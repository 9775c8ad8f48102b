use crate::MIN_TIME;

/*
Amplitude Envelope
==================

A linear ADSR generator. In this crate it mostly shapes short percussive
events (rain droplets): a fast attack, a short decay and no sustain, so each
trigger produces a single "tick" of filtered noise.

    Level
      1.0 ┐  ╱╲
          │ ╱  ╲
          │╱    ╲
      0.0 └──────╲────────→ Time
          A   D    (sustain = 0, envelope goes idle)

Retriggering
------------

Droplets are scheduled on an irregular grid and can arrive while the previous
one is still decaying. Jumping the level back to 0.0 at that moment would be an
instant discontinuity, which is audible as a click. Instead, a retrigger starts
the attack from the CURRENT level and ramps up from there:

      1.0 ┐  ╱╲  ╱╲
          │ ╱  ╲╱  ╲
      0.0 └╱────────╲──→
              ↑ retrigger mid-decay

Increment per sample for a stage of `t` seconds:

    increment = change / (t * sample_rate)

When sustain is zero the decay stage hands straight back to Idle, so
percussive envelopes report themselves inactive once they have died out.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct Envelope {
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,

    stage: EnvelopeState,
    level: f32,

    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Envelope {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            decay_time: decay.max(MIN_TIME),
            sustain_level: sustain.clamp(0.0, 1.0),
            release_time: release.max(MIN_TIME),

            stage: EnvelopeState::Idle,
            level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    /// Percussive shape: attack then decay to silence, no sustain.
    pub fn percussive(attack: f32, decay: f32) -> Self {
        Self::adsr(attack, decay, 0.0, decay)
    }

    /// Gate high. The attack continues from the current level.
    pub fn note_on(&mut self) {
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: start the release phase from current level.
    pub fn note_off(&mut self, sample_rate: f32) {
        if self.stage == EnvelopeState::Idle {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (self.release_time * sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance the envelope by one sample and return the new level.
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level += 1.0 / (self.attack_time * sample_rate);

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                let target = self.sustain_level;
                self.level -= (1.0 - target) / (self.decay_time * sample_rate);

                if self.level <= target {
                    self.level = target;
                    self.stage = if target <= 0.0 {
                        EnvelopeState::Idle
                    } else {
                        EnvelopeState::Sustain
                    };
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeState::Release => {
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeState::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.release_elapsed_samples = 0;
        self.release_start_level = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn render_samples(env: &mut Envelope, samples: usize) {
        for _ in 0..samples {
            env.next_sample(SAMPLE_RATE);
        }
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::adsr(0.01, 0.1, 0.7, 0.2);

        env.note_on();
        render_samples(&mut env, (0.01 * SAMPLE_RATE) as usize + 2);

        assert!(env.level() > 0.99, "expected attack to reach full level");
        assert_ne!(env.state(), EnvelopeState::Attack);
    }

    #[test]
    fn percussive_envelope_returns_to_idle() {
        let mut env = Envelope::percussive(0.01, 0.08);

        env.note_on();
        render_samples(&mut env, ((0.01 + 0.08) * SAMPLE_RATE) as usize + 5);

        assert_eq!(env.state(), EnvelopeState::Idle);
        assert!(env.level() <= 1e-6);
        assert!(!env.is_active());
    }

    #[test]
    fn retrigger_mid_decay_does_not_jump_to_zero() {
        let mut env = Envelope::percussive(0.01, 0.08);

        env.note_on();
        render_samples(&mut env, 40);
        let before = env.level();
        assert!(before > 0.2);

        env.note_on();
        let after = env.next_sample(SAMPLE_RATE);
        assert!(after >= before, "retrigger dropped from {before} to {after}");
    }

    #[test]
    fn release_falls_back_to_idle() {
        let release = 0.03;
        let mut env = Envelope::adsr(0.01, 0.05, 0.5, release);

        env.note_on();
        render_samples(&mut env, (0.02 * SAMPLE_RATE) as usize);

        env.note_off(SAMPLE_RATE);
        render_samples(&mut env, (release * SAMPLE_RATE) as usize + 2);

        assert!(env.level() <= 0.001, "release should fall back to zero");
        assert_eq!(env.state(), EnvelopeState::Idle);
    }
}
