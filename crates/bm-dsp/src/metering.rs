//! Block peak measurement and decaying display meters

use bm_core::Sample;

/// Per-tick decay applied when no louder peak arrives
pub const METER_DECAY: f64 = 0.95;

/// Below this the meter snaps to silence
pub const METER_FLOOR: f64 = 0.001;

/// Absolute peak of a block
#[inline]
pub fn block_peak(samples: &[Sample]) -> f64 {
    samples.iter().fold(0.0, |peak: f64, &s| peak.max(s.abs()))
}

/// Peak meter with instant attack and geometric release.
///
/// Peaks accumulate through [`DecayingMeter::update`]; each
/// [`DecayingMeter::tick`] consumes the largest pending peak and either jumps
/// to it or decays toward zero.
#[derive(Debug, Clone, Default)]
pub struct DecayingMeter {
    pending: f64,
    level: f64,
}

impl DecayingMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a peak since the last tick
    #[inline]
    pub fn update(&mut self, peak: f64) {
        self.pending = self.pending.max(peak);
    }

    /// Advance one display frame and return the new level
    pub fn tick(&mut self) -> f64 {
        let peak = std::mem::take(&mut self.pending);

        if peak > self.level {
            self.level = peak;
        } else if self.level > METER_FLOOR {
            self.level *= METER_DECAY;
        } else {
            self.level = 0.0;
        }
        self.level
    }

    #[inline]
    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn level_db(&self) -> f64 {
        20.0 * self.level.max(1e-10).log10()
    }

    pub fn reset(&mut self) {
        self.pending = 0.0;
        self.level = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_block_peak() {
        assert_eq!(block_peak(&[0.1, -0.7, 0.3]), 0.7);
        assert_eq!(block_peak(&[]), 0.0);
    }

    #[test]
    fn test_instant_attack() {
        let mut meter = DecayingMeter::new();
        meter.update(0.2);
        meter.update(0.8);
        meter.update(0.5);
        assert_eq!(meter.tick(), 0.8);
    }

    #[test]
    fn test_decay_and_floor() {
        let mut meter = DecayingMeter::new();
        meter.update(1.0);
        meter.tick();
        assert_relative_eq!(meter.tick(), 0.95, epsilon = 1e-12);
        assert_relative_eq!(meter.tick(), 0.9025, epsilon = 1e-12);

        // 0.95^135 < 0.001
        for _ in 0..200 {
            meter.tick();
        }
        assert_eq!(meter.level(), 0.0);
        assert!(meter.level_db() < -190.0);
    }

    #[test]
    fn test_quieter_peak_does_not_interrupt_decay() {
        let mut meter = DecayingMeter::new();
        meter.update(1.0);
        meter.tick();
        meter.update(0.1);
        assert_relative_eq!(meter.tick(), 0.95, epsilon = 1e-12);
    }
}
