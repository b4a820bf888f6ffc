//! 4th-order Linkwitz-Riley low-pass
//!
//! Two identical Butterworth low-pass sections in series. Used for the
//! summed bass path and for the discrete LFE channel.

use bm_core::Sample;

use crate::biquad::{BiquadCoeffs, BiquadTDF2};
use crate::design::{self, LINKWITZ_RILEY_SECTIONS};
use crate::{MonoProcessor, Processor};

#[derive(Debug, Clone)]
pub struct LinkwitzRileyLowpass {
    stages: [BiquadTDF2; LINKWITZ_RILEY_SECTIONS],
    cutoff: f64,
    sample_rate: f64,
}

impl LinkwitzRileyLowpass {
    pub fn new(cutoff: f64, sample_rate: f64) -> Self {
        let mut filter = Self {
            stages: std::array::from_fn(|_| BiquadTDF2::new(sample_rate)),
            cutoff,
            sample_rate,
        };
        filter.update_coeffs();
        filter
    }

    /// Clear both delay lines and redesign at the new sample rate
    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        for stage in &mut self.stages {
            stage.prepare(sample_rate);
        }
        self.update_coeffs();
    }

    /// Retune without touching filter state
    pub fn set_cutoff_frequency(&mut self, cutoff: f64) {
        self.cutoff = cutoff;
        self.update_coeffs();
    }

    fn update_coeffs(&mut self) {
        let sections = design::linkwitz_riley_lowpass(self.cutoff, self.sample_rate);
        for (stage, coeffs) in self.stages.iter_mut().zip(sections) {
            stage.set_coeffs(coeffs);
        }
    }

    #[inline]
    pub fn process_in_place(&mut self, samples: &mut [Sample]) {
        for sample in samples.iter_mut() {
            *sample = self.process_sample(*sample);
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

    /// Coefficients of both sections
    pub fn coefficients(&self) -> [BiquadCoeffs; LINKWITZ_RILEY_SECTIONS] {
        std::array::from_fn(|i| *self.stages[i].coeffs())
    }

    pub fn frequency_response(&self, freq: f64) -> (f64, f64) {
        design::cascade_response(&self.coefficients(), freq, self.sample_rate)
    }
}

impl Processor for LinkwitzRileyLowpass {
    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

impl MonoProcessor for LinkwitzRileyLowpass {
    #[inline(always)]
    fn process_sample(&mut self, input: Sample) -> Sample {
        let mid = self.stages[0].process_sample(input);
        self.stages[1].process_sample(mid)
    }
}
