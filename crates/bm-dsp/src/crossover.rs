//! Five-channel crossover high-pass bank
//!
//! One 8th-order Butterworth high-pass cascade per main channel. All stages
//! live in a single fixed-size arena indexed by (channel slot, section), so
//! the bank owns no heap memory and never reallocates. Every cascade shares
//! the same tuning; delay lines are per stage and never shared.

use bm_core::{DEFAULT_CROSSOVER_HZ, NUM_MAIN_CHANNELS, Sample};

use crate::biquad::{BiquadCoeffs, BiquadTDF2};
use crate::design::{self, HIGHPASS_SECTIONS};
use crate::{MonoProcessor, Processor};

const NUM_STAGES: usize = NUM_MAIN_CHANNELS * HIGHPASS_SECTIONS;

/// High-pass filter bank for the five main channels
#[derive(Debug, Clone)]
pub struct CrossoverBank {
    stages: [BiquadTDF2; NUM_STAGES],
    sections: [BiquadCoeffs; HIGHPASS_SECTIONS],
    cutoff: f64,
    sample_rate: f64,
}

impl CrossoverBank {
    pub fn new(sample_rate: f64) -> Self {
        let mut bank = Self {
            stages: std::array::from_fn(|_| BiquadTDF2::new(sample_rate)),
            sections: [BiquadCoeffs::bypass(); HIGHPASS_SECTIONS],
            cutoff: DEFAULT_CROSSOVER_HZ,
            sample_rate,
        };
        bank.retune(DEFAULT_CROSSOVER_HZ, sample_rate);
        bank
    }

    /// Clear every delay line and design the bank for `cutoff`
    pub fn prepare(&mut self, sample_rate: f64, cutoff: f64) {
        for stage in &mut self.stages {
            stage.prepare(sample_rate);
        }
        self.retune(cutoff, sample_rate);
    }

    /// Redesign once and push the sections into every cascade.
    ///
    /// Delay lines are preserved, so this is safe mid-stream.
    pub fn retune(&mut self, cutoff: f64, sample_rate: f64) {
        self.cutoff = cutoff;
        self.sample_rate = sample_rate;
        self.sections = design::butterworth_highpass(cutoff, sample_rate);

        for cascade in self.stages.chunks_exact_mut(HIGHPASS_SECTIONS) {
            for (stage, coeffs) in cascade.iter_mut().zip(self.sections.iter()) {
                stage.set_coeffs(*coeffs);
            }
        }
    }

    /// High-pass one main channel in place. `slot` indexes `Channel::MAIN`.
    #[inline]
    pub fn process_channel_in_place(&mut self, slot: usize, samples: &mut [Sample]) {
        let start = slot * HIGHPASS_SECTIONS;
        let cascade = &mut self.stages[start..start + HIGHPASS_SECTIONS];

        for sample in samples.iter_mut() {
            let mut y = *sample;
            for stage in cascade.iter_mut() {
                y = stage.process_sample(y);
            }
            *sample = y;
        }
    }

    #[inline]
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Current section coefficients, shared by all cascades
    #[inline]
    pub fn sections(&self) -> &[BiquadCoeffs; HIGHPASS_SECTIONS] {
        &self.sections
    }

    /// Stage `section` of the cascade for channel `slot`
    pub fn stage(&self, slot: usize, section: usize) -> &BiquadTDF2 {
        assert!(section < HIGHPASS_SECTIONS);
        &self.stages[slot * HIGHPASS_SECTIONS + section]
    }

    /// Magnitude and phase of one cascade at `freq`
    pub fn frequency_response(&self, freq: f64) -> (f64, f64) {
        design::cascade_response(&self.sections, freq, self.sample_rate)
    }
}

impl Processor for CrossoverBank {
    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const SR: f64 = 44100.0;

    fn sine(freq: f64, len: usize) -> Vec<f64> {
        (0..len).map(|i| (2.0 * PI * freq * i as f64 / SR).sin()).collect()
    }

    fn rms(signal: &[f64]) -> f64 {
        (signal.iter().map(|x| x * x).sum::<f64>() / signal.len() as f64).sqrt()
    }

    #[test]
    fn test_all_cascades_share_tuning() {
        let mut bank = CrossoverBank::new(SR);
        bank.retune(90.0, SR);
        for slot in 0..NUM_MAIN_CHANNELS {
            for section in 0..HIGHPASS_SECTIONS {
                assert_eq!(bank.stage(slot, section).coeffs(), &bank.sections()[section]);
            }
        }
        assert_eq!(bank.cutoff(), 90.0);
    }

    #[test]
    fn test_channels_have_independent_state() {
        let mut bank = CrossoverBank::new(SR);
        bank.prepare(SR, 60.0);

        let mut signal = sine(1000.0, 256);
        bank.process_channel_in_place(2, &mut signal);

        for slot in [0, 1, 3, 4] {
            for section in 0..HIGHPASS_SECTIONS {
                assert_eq!(bank.stage(slot, section).state(), (0.0, 0.0));
            }
        }
        assert_ne!(bank.stage(2, 0).state(), (0.0, 0.0));
    }

    #[test]
    fn test_highpass_selectivity() {
        let mut bank = CrossoverBank::new(SR);
        bank.prepare(SR, 60.0);

        let mut high = sine(1000.0, 44100);
        let mut low = sine(30.0, 44100);
        bank.process_channel_in_place(0, &mut high);
        bank.process_channel_in_place(1, &mut low);

        let settled = 4410;
        let high_db = 20.0 * (rms(&high[settled..]) / (0.5f64).sqrt()).log10();
        let low_db = 20.0 * (rms(&low[settled..]) / (0.5f64).sqrt()).log10();
        assert!(high_db.abs() < 0.1, "passband {}", high_db);
        assert!(low_db < -45.0, "stopband {}", low_db);
    }

    #[test]
    fn test_retune_keeps_delay_lines() {
        let mut bank = CrossoverBank::new(SR);
        bank.prepare(SR, 60.0);
        let mut signal = sine(200.0, 128);
        bank.process_channel_in_place(0, &mut signal);

        let state = bank.stage(0, 3).state();
        bank.retune(61.0, SR);
        assert_eq!(bank.stage(0, 3).state(), state);
    }

    #[test]
    fn test_prepare_twice_is_idempotent() {
        let mut a = CrossoverBank::new(SR);
        let mut b = CrossoverBank::new(SR);
        a.prepare(SR, 75.0);
        b.prepare(SR, 75.0);
        b.prepare(SR, 75.0);

        let mut sa = sine(40.0, 512);
        let mut sb = sa.clone();
        a.process_channel_in_place(4, &mut sa);
        b.process_channel_in_place(4, &mut sb);
        assert_eq!(sa, sb);
    }
}
