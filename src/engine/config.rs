#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Engine settings.
///
/// `sample_rate` is the rate the graph starts with; a device output replaces
/// it with the device's own rate when it opens.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Linear gain of the master bus.
    pub master_level: f32,
    /// Seconds used to glide master level changes.
    pub master_ramp: f64,
    /// Peak readings buffered for a level meter.
    pub meter_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            master_level: 1.0,
            master_ramp: 0.05,
            meter_capacity: 64,
        }
    }
}

impl EngineConfig {
    pub fn sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn master_level(mut self, level: f32) -> Self {
        self.master_level = level;
        self
    }

    pub fn meter_capacity(mut self, capacity: usize) -> Self {
        self.meter_capacity = capacity;
        self
    }
}
