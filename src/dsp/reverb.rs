//! Schroeder reverb tuned by decay time.
//!
//! ```text
//! Input ──┬──→ [Comb 1] ──┐
//!         ├──→ [Comb 2] ──┤
//!         ├──→ [Comb 3] ──┼──→ (+) ──→ [Allpass 1] ──→ [Allpass 2] ──→ Output
//!         └──→ [Comb 4] ──┘
//! ```
//!
//! Each comb's feedback is derived from the requested decay (RT60, the time
//! for the tail to fall by 60 dB) and that comb's loop length:
//!
//! ```text
//! g = 10 ^ (-3 * loop_seconds / decay_seconds)
//! ```
//!
//! so every comb decays at the same rate regardless of its delay. Delay lines
//! are sized once for the sample rate; nothing allocates while processing.

use super::flush_denormal;

const COMB_DELAYS_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];
const ALLPASS_DELAYS_MS: [f32; 2] = [5.0, 1.7];
const ALLPASS_FEEDBACK: f32 = 0.5;
const MAX_COMB_FEEDBACK: f32 = 0.98;

fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    ((ms * sample_rate / 1000.0) as usize).max(1)
}

/// Feedback comb with a one-pole lowpass in the loop.
pub struct CombFilter {
    buffer: Vec<f32>,
    pos: usize,
    feedback: f32,
    damp: f32,
    filter_state: f32,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            pos: 0,
            feedback: 0.5,
            damp: 0.5,
            filter_state: 0.0,
        }
    }

    pub fn delay_samples(&self) -> usize {
        self.buffer.len()
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, MAX_COMB_FEEDBACK);
    }

    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp.clamp(0.0, 1.0);
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.pos];

        self.filter_state =
            flush_denormal(output * (1.0 - self.damp) + self.filter_state * self.damp);
        self.buffer[self.pos] = flush_denormal(input + self.filter_state * self.feedback);
        self.pos = (self.pos + 1) % self.buffer.len();

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.filter_state = 0.0;
        self.pos = 0;
    }
}

/// Diffusing allpass stage.
pub struct AllpassFilter {
    buffer: Vec<f32>,
    pos: usize,
    feedback: f32,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            pos: 0,
            feedback: ALLPASS_FEEDBACK,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.9);
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.pos];
        let output = -self.feedback * input + delayed;

        self.buffer[self.pos] = flush_denormal(input + self.feedback * output);
        self.pos = (self.pos + 1) % self.buffer.len();

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

pub struct SchroederReverb {
    combs: [CombFilter; 4],
    allpasses: [AllpassFilter; 2],
    sample_rate: f32,
    decay: f32,
}

impl SchroederReverb {
    pub fn new(sample_rate: f32, decay_seconds: f32) -> Self {
        let combs = COMB_DELAYS_MS.map(|ms| CombFilter::new(ms_to_samples(ms, sample_rate)));
        let allpasses =
            ALLPASS_DELAYS_MS.map(|ms| AllpassFilter::new(ms_to_samples(ms, sample_rate)));

        let mut reverb = Self {
            combs,
            allpasses,
            sample_rate,
            decay: decay_seconds,
        };
        reverb.set_decay(decay_seconds);
        reverb
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// Set the RT60 decay time in seconds.
    pub fn set_decay(&mut self, decay_seconds: f32) {
        self.decay = decay_seconds.max(0.01);
        for comb in &mut self.combs {
            let loop_seconds = comb.delay_samples() as f32 / self.sample_rate;
            comb.set_feedback(10f32.powf(-3.0 * loop_seconds / self.decay));
        }
    }

    /// High frequency absorption (0.0 bright, 1.0 dark).
    pub fn set_damping(&mut self, damp: f32) {
        for comb in &mut self.combs {
            comb.set_damp(damp);
        }
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let mut output = 0.0;
        for comb in &mut self.combs {
            output += comb.process(input);
        }
        output *= 0.25;

        for allpass in &mut self.allpasses {
            output = allpass.process(output);
        }

        output
    }

    pub fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
    }
}
