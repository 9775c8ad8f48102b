//! Low-level DSP primitives used by the signal graph.
//!
//! These components are allocation-free once constructed and safe to run on
//! the audio thread. They stay focused on the signal-processing math; the
//! graph layer adds parameters, automation and wiring on top.

/// Compressor, limiter and decibel helpers.
pub mod dynamics;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable filter with cascadable stages.
pub mod filter;
/// Sine LFO with range mapping.
pub mod lfo;
/// White, pink and brown noise.
pub mod noise;
/// Schroeder reverb parameterised by decay time.
pub mod reverb;

pub use envelope::EnvelopeState;

/// Below this, recursive state is treated as silence.
pub const DENORMAL_THRESHOLD: f32 = 1e-20;

/// Flush a decaying state value to zero before it goes subnormal.
///
/// Feedback state fed with silence must reach exact zero, not a subnormal
/// tail. Apply this wherever a recurrence writes its state back.
#[inline]
pub fn flush_denormal(value: f32) -> f32 {
    if value.abs() < DENORMAL_THRESHOLD {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_values_flush_to_zero() {
        assert_eq!(flush_denormal(1e-30), 0.0);
        assert_eq!(flush_denormal(-f32::MIN_POSITIVE / 4.0), 0.0);
        assert_eq!(flush_denormal(1e-3), 1e-3);
        assert_eq!(flush_denormal(-0.5), -0.5);
    }
}
