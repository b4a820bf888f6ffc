//! Linear parameter ramps
//!
//! A [`LinearSmoother`] walks from its current value to a target in a fixed
//! number of equal steps. The step count is derived from the ramp time and
//! the rate at which [`LinearSmoother::next_value`] is called: the engine
//! calls it once per block, so one step is one block.
//!
//! Changing the target mid-ramp restarts the countdown from the current value,
//! which keeps the ramp monotonic toward whatever the latest target is.

/// Linear ramp generator
#[derive(Debug, Clone)]
pub struct LinearSmoother {
    current: f64,
    target: f64,
    step: f64,
    countdown: u32,
    steps_to_target: u32,
}

impl LinearSmoother {
    pub fn new(initial: f64) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            countdown: 0,
            steps_to_target: 0,
        }
    }

    /// Recompute the step count for `rate` ticks per second and a ramp of
    /// `ramp_seconds`. Any ramp in progress is abandoned at its target.
    pub fn reset(&mut self, rate: f64, ramp_seconds: f64) {
        let steps = (ramp_seconds * rate).floor();
        self.steps_to_target = if steps.is_finite() && steps > 0.0 {
            steps.min(u32::MAX as f64) as u32
        } else {
            0
        };
        self.set_current_and_target(self.target);
    }

    /// Jump straight to `value` with no ramp
    pub fn set_current_and_target(&mut self, value: f64) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.countdown = 0;
    }

    /// Start a ramp toward `value`. No-op if it is already the target.
    ///
    /// With a zero-step ramp the current value jumps straight to `value`;
    /// returns true in that case, since no `next_value` step will report it.
    pub fn set_target(&mut self, value: f64) -> bool {
        if value == self.target {
            return false;
        }

        if self.steps_to_target == 0 {
            self.set_current_and_target(value);
            return true;
        }

        self.target = value;
        self.countdown = self.steps_to_target;
        self.step = (self.target - self.current) / self.countdown as f64;
        false
    }

    /// Advance one step and return the new current value
    #[inline]
    pub fn next_value(&mut self) -> f64 {
        if self.countdown == 0 {
            return self.target;
        }

        self.countdown -= 1;
        self.current = if self.countdown == 0 {
            self.target
        } else {
            self.current + self.step
        };
        self.current
    }

    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.countdown > 0
    }

    /// Steps a full ramp takes at the current rate
    #[inline]
    pub fn steps_to_target(&self) -> u32 {
        self.steps_to_target
    }
}

impl Default for LinearSmoother {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_step_count_from_ramp_time() {
        let mut s = LinearSmoother::new(60.0);
        s.reset(44100.0, 0.001);
        assert_eq!(s.steps_to_target(), 44);

        s.reset(48000.0, 0.001);
        assert_eq!(s.steps_to_target(), 48);
    }

    #[test]
    fn test_linear_ramp_reaches_target_exactly() {
        let mut s = LinearSmoother::new(0.0);
        s.reset(1000.0, 0.004);
        s.set_target(1.0);

        let values: Vec<f64> = (0..4).map(|_| s.next_value()).collect();
        assert_relative_eq!(values[0], 0.25, epsilon = 1e-12);
        assert_relative_eq!(values[1], 0.5, epsilon = 1e-12);
        assert_relative_eq!(values[2], 0.75, epsilon = 1e-12);
        assert_eq!(values[3], 1.0);
        assert!(!s.is_smoothing());
        assert_eq!(s.next_value(), 1.0);
    }

    #[test]
    fn test_is_smoothing_tracks_countdown() {
        let mut s = LinearSmoother::new(60.0);
        s.reset(44100.0, 0.001);
        assert!(!s.is_smoothing());

        s.set_target(120.0);
        for _ in 0..43 {
            assert!(s.is_smoothing());
            s.next_value();
        }
        assert!(s.is_smoothing());
        s.next_value();
        assert!(!s.is_smoothing());
        assert_eq!(s.current(), 120.0);
    }

    #[test]
    fn test_same_target_does_not_restart() {
        let mut s = LinearSmoother::new(0.0);
        s.reset(100.0, 0.1);
        s.set_target(10.0);
        s.next_value();
        s.next_value();
        let mid = s.current();

        s.set_target(10.0);
        s.next_value();
        assert_relative_eq!(s.current(), mid + 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_retarget_mid_ramp_is_monotonic() {
        let mut s = LinearSmoother::new(0.0);
        s.reset(100.0, 0.1);
        s.set_target(10.0);
        for _ in 0..5 {
            s.next_value();
        }
        s.set_target(4.0);

        let mut prev = s.current();
        while s.is_smoothing() {
            let v = s.next_value();
            assert!(v <= prev);
            prev = v;
        }
        assert_eq!(s.current(), 4.0);
    }

    #[test]
    fn test_zero_ramp_jumps() {
        let mut s = LinearSmoother::new(1.0);
        s.reset(44100.0, 0.0);
        assert!(s.set_target(2.0));
        assert!(!s.is_smoothing());
        assert_eq!(s.current(), 2.0);
        assert!(!s.set_target(2.0));
    }

    #[test]
    fn test_ramped_target_does_not_report_jump() {
        let mut s = LinearSmoother::new(1.0);
        s.reset(1000.0, 0.01);
        assert!(!s.set_target(2.0));
        assert!(s.is_smoothing());
        assert_eq!(s.current(), 1.0);
    }

    #[test]
    fn test_reset_abandons_ramp() {
        let mut s = LinearSmoother::new(0.0);
        s.reset(1000.0, 0.01);
        s.set_target(5.0);
        s.next_value();
        s.reset(1000.0, 0.01);
        assert!(!s.is_smoothing());
        assert_eq!(s.current(), 5.0);
    }
}
