//! Automatable parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Parameter Automation
====================

Every automatable value (a gain, a filter frequency, a source level) is a
`Param`: a base value plus a timeline of scheduled events on the graph clock.

  Set   { time, value }   jump to `value` at `time`
  Ramp  { time, value }   arrive at `value` at `time`, moving linearly from
                          the previous event

    value
      │          ╱‾‾‾‾‾‾‾‾
      │         ╱
      │________╱
      └───────┬─────┬────→ time
             Set   Ramp

Volume changes are always written as ramps over a short window (tens of
milliseconds). A stepped gain is an instant discontinuity in the waveform,
which is heard as a click.

Modulation edges (an LFO connected to the parameter) are added on top of the
automated value, sample by sample.

Decibel parameters
------------------

Source levels are stored in dB with `-inf` meaning silence. Interpolating
towards or away from `-inf` would never move, so ramps treat `-inf` as
`SILENCE_FLOOR_DB` while interpolating. The end point itself is exact.

Bookkeeping
-----------

At the start of every block the graph folds events that lie fully in the past
into the base value. An event that anchors a ramp still running is kept.
*/

/// Level treated as silence while ramping decibel parameters.
pub const SILENCE_FLOOR_DB: f32 = -100.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    /// Linear amplitude multiplier.
    Gain,
    /// Frequency in Hz (filter cutoff/centre, LFO rate).
    Frequency,
    /// Filter resonance.
    Q,
    /// Source output level in decibels.
    Level,
}

impl ParamId {
    pub(crate) const COUNT: usize = 4;

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            ParamId::Gain => 0,
            ParamId::Frequency => 1,
            ParamId::Q => 2,
            ParamId::Level => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Linear,
    Decibels,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Event {
    Set { time: f64, value: f32 },
    Ramp { time: f64, value: f32 },
}

impl Event {
    fn time(&self) -> f64 {
        match *self {
            Event::Set { time, .. } | Event::Ramp { time, .. } => time,
        }
    }

    fn value(&self) -> f32 {
        match *self {
            Event::Set { value, .. } | Event::Ramp { value, .. } => value,
        }
    }

    fn is_ramp(&self) -> bool {
        matches!(self, Event::Ramp { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    base: f32,
    scale: Scale,
    events: Vec<Event>,
    /// Last time the timeline was resolved; anchors ramps scheduled with no
    /// earlier event.
    resolved_at: f64,
}

impl Param {
    pub fn linear(value: f32) -> Self {
        Self {
            base: value,
            scale: Scale::Linear,
            events: Vec::new(),
            resolved_at: 0.0,
        }
    }

    pub fn decibels(value: f32) -> Self {
        Self {
            scale: Scale::Decibels,
            ..Self::linear(value)
        }
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Set immediately, dropping every scheduled event.
    pub fn set_value(&mut self, value: f32) {
        self.events.clear();
        self.base = value;
    }

    pub fn set_value_at(&mut self, value: f32, time: f64) {
        self.insert(Event::Set { time, value });
    }

    /// Ramp linearly from the previous event to `value`, arriving at `time`.
    pub fn linear_ramp_to_value_at(&mut self, value: f32, time: f64) {
        let anchored = self.events.iter().any(|e| e.time() <= time);
        if !anchored {
            let start = self.resolved_at.min(time);
            let from = self.value_at(start);
            self.insert(Event::Set {
                time: start,
                value: from,
            });
        }
        self.insert(Event::Ramp { time, value });
    }

    /// Glide from wherever the parameter is at `now` to `value` over
    /// `duration` seconds, replacing anything scheduled after `now`.
    pub fn ramp_to(&mut self, value: f32, duration: f64, now: f64) {
        let current = self.value_at(now);
        self.cancel_scheduled_values(now);
        self.set_value_at(current, now);
        self.linear_ramp_to_value_at(value, now + duration.max(0.0));
    }

    /// Drop every event at or after `from`.
    pub fn cancel_scheduled_values(&mut self, from: f64) {
        self.events.retain(|e| e.time() < from);
    }

    /// Freeze at the value reached at `now` and drop the whole timeline.
    pub fn cancel_and_hold(&mut self, now: f64) {
        self.base = self.value_at(now);
        self.events.clear();
        self.resolved_at = now;
    }

    /// Events still waiting to happen after `now`.
    pub fn pending(&self, now: f64) -> usize {
        self.events.iter().filter(|e| e.time() > now).count()
    }

    pub fn value_at(&self, time: f64) -> f32 {
        let mut prev_time = f64::NEG_INFINITY;
        let mut prev_value = self.base;

        for event in &self.events {
            let event_time = event.time();
            if event_time > time {
                if event.is_ramp() && prev_time.is_finite() {
                    let span = event_time - prev_time;
                    let progress = if span > 0.0 {
                        ((time - prev_time) / span) as f32
                    } else {
                        1.0
                    };
                    return self.interpolate(prev_value, event.value(), progress);
                }
                break;
            }
            prev_time = event_time;
            prev_value = event.value();
        }

        prev_value
    }

    fn interpolate(&self, from: f32, to: f32, progress: f32) -> f32 {
        let progress = progress.clamp(0.0, 1.0);
        match self.scale {
            Scale::Linear => from + (to - from) * progress,
            Scale::Decibels => {
                let from = from.max(SILENCE_FLOOR_DB);
                let to = to.max(SILENCE_FLOOR_DB);
                from + (to - from) * progress
            }
        }
    }

    fn insert(&mut self, event: Event) {
        let at = self
            .events
            .iter()
            .position(|e| e.time() > event.time())
            .unwrap_or(self.events.len());
        self.events.insert(at, event);
    }

    /// Fold events that are entirely in the past into the base value.
    pub(crate) fn prune(&mut self, now: f64) {
        self.resolved_at = now;
        while let Some(first) = self.events.first() {
            if first.time() > now {
                break;
            }
            if let Some(next) = self.events.get(1) {
                if next.is_ramp() && next.time() > now {
                    break;
                }
            }
            self.base = first.value();
            self.events.remove(0);
        }
    }

    /// Write one value per sample starting at `start`.
    pub(crate) fn fill(&self, out: &mut [f32], start: f64, sample_rate: f32) {
        if self.events.is_empty() {
            out.fill(self.base);
            return;
        }

        let dt = 1.0 / sample_rate as f64;
        for (i, value) in out.iter_mut().enumerate() {
            *value = self.value_at(start + i as f64 * dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_interpolates_linearly() {
        let mut gain = Param::linear(0.0);
        gain.ramp_to(1.0, 1.0, 0.0);

        assert!((gain.value_at(0.0) - 0.0).abs() < 1e-6);
        assert!((gain.value_at(0.25) - 0.25).abs() < 1e-6);
        assert!((gain.value_at(1.0) - 1.0).abs() < 1e-6);
        assert!((gain.value_at(5.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn ramp_to_starts_from_current_value_mid_ramp() {
        let mut gain = Param::linear(0.0);
        gain.ramp_to(1.0, 1.0, 0.0);
        gain.ramp_to(0.0, 1.0, 0.5);

        assert!((gain.value_at(0.5) - 0.5).abs() < 1e-6);
        assert!((gain.value_at(1.0) - 0.25).abs() < 1e-6);
        assert!((gain.value_at(1.5) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn set_then_ramp_defers_movement() {
        let mut level = Param::linear(0.0);
        level.set_value_at(0.0, 0.2);
        level.linear_ramp_to_value_at(1.0, 2.2);

        assert_eq!(level.value_at(0.1), 0.0);
        assert!((level.value_at(1.2) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn unanchored_ramp_starts_at_last_resolution() {
        let mut gain = Param::linear(0.5);
        gain.prune(1.0);
        gain.linear_ramp_to_value_at(1.5, 2.0);

        assert!((gain.value_at(1.0) - 0.5).abs() < 1e-6);
        assert!((gain.value_at(1.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn decibel_ramp_leaves_negative_infinity() {
        let mut level = Param::decibels(f32::NEG_INFINITY);
        level.ramp_to(0.0, 1.0, 0.0);

        let halfway = level.value_at(0.5);
        assert!((halfway - SILENCE_FLOOR_DB / 2.0).abs() < 1e-3);
        assert_eq!(level.value_at(1.0), 0.0);
    }

    #[test]
    fn cancel_and_hold_freezes_value() {
        let mut gain = Param::linear(0.0);
        gain.ramp_to(1.0, 1.0, 0.0);
        gain.cancel_and_hold(0.5);

        assert_eq!(gain.pending(0.5), 0);
        assert!((gain.value_at(0.9) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn prune_keeps_anchor_of_running_ramp() {
        let mut gain = Param::linear(0.0);
        gain.ramp_to(1.0, 1.0, 0.0);
        gain.prune(0.5);

        assert!((gain.value_at(0.75) - 0.75).abs() < 1e-6);

        gain.prune(2.0);
        assert_eq!(gain.pending(2.0), 0);
        assert_eq!(gain.value_at(2.0), 1.0);
    }

    #[test]
    fn pending_counts_future_events_only() {
        let mut gain = Param::linear(0.0);
        gain.set_value_at(1.0, 0.5);
        gain.set_value_at(0.0, 1.5);

        assert_eq!(gain.pending(0.0), 2);
        assert_eq!(gain.pending(1.0), 1);
        assert_eq!(gain.pending(2.0), 0);
    }
}
